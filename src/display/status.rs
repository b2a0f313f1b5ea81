// Status rendering
// Turns cycle reports into the prediction line and alert banner text

use std::io::{self, Stdout, Write};

use crate::alert::AlertLevel;
use crate::pipeline::driver::CycleReport;

/// Receives one report per classified cycle
pub trait DisplaySink {
    fn show(&mut self, report: &CycleReport);
}

/// Banner text for an alert level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusMessage {
    pub headline: &'static str,
    pub advice: &'static str,
}

impl StatusMessage {
    pub fn for_level(level: AlertLevel) -> Self {
        match level {
            AlertLevel::Clear => StatusMessage {
                headline: "Rhythm normal",
                advice: "No action needed.",
            },
            AlertLevel::Orange => StatusMessage {
                headline: "Irregular beats detected",
                advice: "Rest and keep monitoring. Contact your doctor if symptoms appear.",
            },
            AlertLevel::Red => StatusMessage {
                headline: "Frequent irregular beats",
                advice: "Seek medical advice promptly.",
            },
            AlertLevel::Grey => StatusMessage {
                headline: "Signal unclear",
                advice: "Too many beats could not be classified. Check the electrode placement.",
            },
        }
    }
}

/// One-line summary of a cycle
pub fn format_report(report: &CycleReport) -> String {
    format!(
        "Prediction: {} [{}] ({}% confidence) | Actual Label: {} [{}] | Alert: {}",
        report.predicted,
        report.predicted.symbol(),
        (report.confidence * 100.0).round() as u32,
        report.actual,
        report.actual.symbol(),
        report.alert_level
    )
}

/// Writes reports to a text stream
pub struct ConsoleDisplay<W: Write> {
    out: W,
    last_level: AlertLevel,
}

impl ConsoleDisplay<Stdout> {
    pub fn stdout() -> Self {
        ConsoleDisplay::new(io::stdout())
    }
}

impl<W: Write> ConsoleDisplay<W> {
    pub fn new(out: W) -> Self {
        ConsoleDisplay {
            out,
            last_level: AlertLevel::Clear,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn render(&mut self, report: &CycleReport) -> io::Result<()> {
        writeln!(self.out, "{}", format_report(report))?;

        if report.alert_level != self.last_level {
            let status = StatusMessage::for_level(report.alert_level);
            writeln!(
                self.out,
                "[{}] {}. {}",
                report.alert_level, status.headline, status.advice
            )?;
        }

        self.out.flush()
    }
}

impl<W: Write> DisplaySink for ConsoleDisplay<W> {
    fn show(&mut self, report: &CycleReport) {
        if let Err(e) = self.render(report) {
            log::warn!("Failed to write status: {}", e);
        }

        if report.alert_level != self.last_level {
            log::info!(
                "Alert level changed {} -> {} (abnormal {}, unknown {})",
                self.last_level,
                report.alert_level,
                report.abnormal,
                report.unknown
            );
            self.last_level = report.alert_level;
        }
    }
}

/// Keeps every report, for tests and embedding
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    pub reports: Vec<CycleReport>,
}

impl DisplaySink for RecordingDisplay {
    fn show(&mut self, report: &CycleReport) {
        self.reports.push(report.clone());
    }
}
