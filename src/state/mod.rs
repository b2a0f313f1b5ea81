// State management module
// Handles configuration loading and file system operations

pub mod config;
pub mod storage;

pub use config::{ConfigError, MonitorConfig};
pub use storage::{calculate_sha256, get_app_config_dir, StorageError};
