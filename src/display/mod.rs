// Display module
// Renders each classified cycle and the current alert banner

pub mod status;

pub use status::{format_report, ConsoleDisplay, DisplaySink, RecordingDisplay, StatusMessage};
