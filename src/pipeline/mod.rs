// Pipeline execution and monitoring module
// Drives the sample -> model -> alert cycle and records it

pub mod driver;
pub mod trace;

pub use driver::{
    run_manual, run_periodic, stdin_lines, CycleOutcome, CycleReport, Monitor, MonitorStats,
    Trigger,
};
pub use trace::{read_trace_file, TraceBuilder, TraceEntry, TraceError, TraceWriter};
