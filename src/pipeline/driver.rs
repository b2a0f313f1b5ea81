// Monitoring driver
// Runs one sample through encode -> infer -> decide -> alert per trigger

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::io::BufRead;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::alert::{AlertLevel, AlertState};
use crate::classify::{decide, encode, BeatClass, BoxedEngine, EncodingError, EngineError, ScoreVector};
use crate::display::DisplaySink;
use crate::pipeline::trace::TraceWriter;
use crate::samples::SampleSource;

/// What starts a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    /// Repeating timer; the next cycle is scheduled after the current one ends
    #[default]
    Periodic,
    /// One cycle per user request
    Manual,
}

/// Everything the display needs about one classified beat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    pub cycle: u64,
    pub sample_index: usize,
    pub predicted: BeatClass,
    pub actual: BeatClass,
    pub confidence: f32,
    pub scores: ScoreVector,
    pub alert_level: AlertLevel,
    pub abnormal: u32,
    pub unknown: u32,
}

impl CycleReport {
    pub fn is_correct(&self) -> bool {
        self.predicted == self.actual
    }
}

/// Result of a single tick
#[derive(Debug)]
pub enum CycleOutcome {
    Classified(CycleReport),
    /// No samples are loaded
    NoData,
    /// No model is open; the sample cursor is left untouched
    EngineUnavailable,
    /// The sample could not be packed for the model
    EncodingFailed(EncodingError),
    /// The model rejected the input
    InferenceFailed(EngineError),
}

/// Running totals for a session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MonitorStats {
    pub ticks: u64,
    pub classified: u64,
    pub correct: u64,
    pub no_data: u64,
    pub engine_unavailable: u64,
    pub failed: u64,
}

/// Owns the pipeline state for one session
pub struct Monitor {
    source: SampleSource,
    engine: Option<BoxedEngine>,
    alerts: AlertState,
    trace: Option<TraceWriter>,
    stats: MonitorStats,
}

impl Monitor {
    pub fn new(source: SampleSource, engine: Option<BoxedEngine>, alerts: AlertState) -> Self {
        Monitor {
            source,
            engine,
            alerts,
            trace: None,
            stats: MonitorStats::default(),
        }
    }

    /// Record every cycle to a JSONL trace
    pub fn with_trace(mut self, trace: Option<TraceWriter>) -> Self {
        self.trace = trace;
        self
    }

    /// Run one cycle
    pub fn tick(&mut self) -> CycleOutcome {
        self.stats.ticks += 1;
        let cycle = self.stats.ticks;

        let outcome = self.run_cycle(cycle);
        match &outcome {
            CycleOutcome::Classified(report) => {
                self.stats.classified += 1;
                if report.is_correct() {
                    self.stats.correct += 1;
                }
                log::debug!(
                    "Cycle {}: sample {} predicted {} (actual {}), alert {}",
                    cycle,
                    report.sample_index,
                    report.predicted,
                    report.actual,
                    report.alert_level
                );
            }
            CycleOutcome::NoData => {
                self.stats.no_data += 1;
                log::debug!("Cycle {}: no sample data", cycle);
            }
            CycleOutcome::EngineUnavailable => {
                self.stats.engine_unavailable += 1;
                log::debug!("Cycle {}: model unavailable", cycle);
            }
            CycleOutcome::EncodingFailed(e) => {
                self.stats.failed += 1;
                log::warn!("Cycle {}: skipping sample, {}", cycle, e);
            }
            CycleOutcome::InferenceFailed(e) => {
                self.stats.failed += 1;
                log::warn!("Cycle {}: inference failed, {}", cycle, e);
            }
        }

        self.record(cycle, &outcome);
        outcome
    }

    fn run_cycle(&mut self, cycle: u64) -> CycleOutcome {
        let Some(engine) = self.engine.as_mut() else {
            return CycleOutcome::EngineUnavailable;
        };

        let Some(sample) = self.source.next() else {
            return CycleOutcome::NoData;
        };
        let actual = sample.label;
        let encoded = encode(&sample.features);
        let sample_index = self.source.cursor().unwrap_or_default();

        let encoded = match encoded {
            Ok(encoded) => encoded,
            Err(e) => return CycleOutcome::EncodingFailed(e),
        };

        let scores = match engine.infer(&encoded) {
            Ok(scores) => scores,
            Err(e) => return CycleOutcome::InferenceFailed(e),
        };

        let decision = decide(&scores);
        let alert_level = self.alerts.observe(decision.class);

        CycleOutcome::Classified(CycleReport {
            cycle,
            sample_index,
            predicted: decision.class,
            actual,
            confidence: decision.confidence,
            scores,
            alert_level,
            abnormal: self.alerts.abnormal(),
            unknown: self.alerts.unknown(),
        })
    }

    fn record(&self, cycle: u64, outcome: &CycleOutcome) {
        let Some(trace) = &self.trace else {
            return;
        };

        let entry = match outcome {
            CycleOutcome::Classified(report) => {
                let data = serde_json::to_value(report).unwrap_or(serde_json::Value::Null);
                trace
                    .stage(cycle, "classification")
                    .with_data(report.predicted.as_str(), data)
            }
            CycleOutcome::NoData => trace.stage(cycle, "skipped").message("no sample data"),
            CycleOutcome::EngineUnavailable => {
                trace.stage(cycle, "skipped").message("model unavailable")
            }
            CycleOutcome::EncodingFailed(e) => trace.stage(cycle, "error").message(e.to_string()),
            CycleOutcome::InferenceFailed(e) => trace.stage(cycle, "error").message(e.to_string()),
        };

        if let Err(e) = trace.write(&entry) {
            log::warn!("Failed to write trace {}: {}", trace.path().display(), e);
        }
    }

    /// Release the model. Further ticks report `EngineUnavailable`.
    pub fn shutdown(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            log::info!("Closing {} engine", engine.name());
            engine.close();
        }
    }

    pub fn has_engine(&self) -> bool {
        self.engine.is_some()
    }

    pub fn alerts(&self) -> &AlertState {
        &self.alerts
    }

    pub fn source(&self) -> &SampleSource {
        &self.source
    }

    pub fn stats(&self) -> &MonitorStats {
        &self.stats
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn present(display: &mut dyn DisplaySink, outcome: &CycleOutcome) {
    if let CycleOutcome::Classified(report) = outcome {
        display.show(report);
    }
}

fn limit_reached(monitor: &Monitor, max_cycles: Option<u64>) -> bool {
    max_cycles.is_some_and(|max| monitor.stats().ticks >= max)
}

/// Tick on a fixed delay until shutdown or `max_cycles`
///
/// The delay starts after a cycle completes, so cycles never overlap. The
/// model is released before returning.
pub async fn run_periodic<S>(
    monitor: &mut Monitor,
    display: &mut dyn DisplaySink,
    interval: Duration,
    max_cycles: Option<u64>,
    shutdown: S,
) -> MonitorStats
where
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    log::info!("Periodic monitoring every {} ms", interval.as_millis());

    loop {
        let outcome = monitor.tick();
        present(display, &outcome);

        if limit_reached(monitor, max_cycles) {
            break;
        }

        tokio::select! {
            _ = &mut shutdown => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    monitor.shutdown();
    monitor.stats().clone()
}

/// Forward stdin lines over a channel from a dedicated thread
///
/// Reading stdin blocks, so it stays off the runtime. The thread ends at EOF
/// or once the receiver is dropped and the next line fails to send.
pub fn stdin_lines() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    let spawned = std::thread::Builder::new()
        .name("stdin".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.blocking_send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        log::error!("Failed to read trigger input: {}", e);
                        break;
                    }
                }
            }
        });

    if let Err(e) = spawned {
        log::error!("Failed to start stdin reader: {}", e);
    }
    rx
}

/// Tick once per input line until the sender closes, shutdown, or `max_cycles`
pub async fn run_manual<S>(
    monitor: &mut Monitor,
    display: &mut dyn DisplaySink,
    mut input: mpsc::Receiver<String>,
    max_cycles: Option<u64>,
    shutdown: S,
) -> MonitorStats
where
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    log::info!("Manual monitoring, press Enter to classify the next beat");

    while !limit_reached(monitor, max_cycles) {
        tokio::select! {
            _ = &mut shutdown => break,
            line = input.recv() => match line {
                Some(_) => {
                    let outcome = monitor.tick();
                    present(display, &outcome);
                }
                None => break,
            }
        }
    }

    monitor.shutdown();
    monitor.stats().clone()
}
