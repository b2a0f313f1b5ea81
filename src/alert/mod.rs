// Alerting module
// Beat counters and threshold-driven alert levels

pub mod state;

pub use state::{AlertLevel, AlertPolicy, AlertState, AlertThresholdOverrides, AlertThresholds};
