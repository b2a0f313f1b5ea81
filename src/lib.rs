// ECG Monitor - beat classification with threshold alerting
// Module declarations

use std::path::PathBuf;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

pub mod alert;
pub mod classify;
pub mod display;
pub mod pipeline;
pub mod samples;
pub mod state;

use alert::AlertState;
use display::ConsoleDisplay;
use pipeline::{Monitor, MonitorStats, TraceWriter, Trigger};
use samples::SampleSource;
use state::{ConfigError, MonitorConfig};

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Install the log output. `RUST_LOG` takes precedence over `default_level`.
pub fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Assemble the monitor from configuration
///
/// Missing samples or an unavailable model are logged and leave the monitor
/// ticking without producing decisions.
pub fn build_monitor(config: &MonitorConfig) -> Monitor {
    let source = SampleSource::open(&config.samples_path);

    let engine = match classify::open_engine(config.backend, &config.model_path) {
        Ok(engine) => Some(engine),
        Err(e) => {
            log::error!(
                "Model {} unavailable: {}",
                config.model_path.display(),
                e
            );
            None
        }
    };

    let alerts = AlertState::with_thresholds(config.alert_policy, config.thresholds());
    let trace = config.trace_path.clone().map(TraceWriter::new);
    if let Some(writer) = &trace {
        log::info!(
            "Tracing session {} to {}",
            writer.session(),
            writer.path().display()
        );
    }

    Monitor::new(source, engine, alerts).with_trace(trace)
}

/// Load configuration and run until Ctrl-C, end of input, or the cycle limit
pub async fn run(config_path: Option<PathBuf>) -> Result<MonitorStats, MonitorError> {
    let config = MonitorConfig::load(config_path.as_deref())?;
    init_logging(&config.log_level);
    log::info!(
        "ECG monitor starting ({:?} trigger, {:?} alert policy)",
        config.trigger,
        config.alert_policy
    );

    let mut monitor = build_monitor(&config);
    let mut display = ConsoleDisplay::stdout();
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
        log::info!("Shutdown requested");
    };

    let stats = match config.trigger {
        Trigger::Periodic => {
            pipeline::run_periodic(
                &mut monitor,
                &mut display,
                config.interval(),
                config.max_cycles,
                shutdown,
            )
            .await
        }
        Trigger::Manual => {
            let input = pipeline::stdin_lines();
            pipeline::run_manual(&mut monitor, &mut display, input, config.max_cycles, shutdown).await
        }
    };

    log::info!(
        "Stopped after {} cycles: {} classified ({} matched label), {} skipped",
        stats.ticks,
        stats.classified,
        stats.correct,
        stats.no_data + stats.engine_unavailable + stats.failed
    );

    Ok(stats)
}
