// File system helpers for configuration and model artifacts
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to get app config directory")]
    NoConfigDir,
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Identifier used for the per-user config directory
pub const APP_DIR_NAME: &str = "com.ecgmonitor.app";

/// Get the config directory for the monitor (not created)
pub fn get_app_config_dir() -> StorageResult<PathBuf> {
    let config_dir = dirs::config_dir().ok_or(StorageError::NoConfigDir)?;
    Ok(config_dir.join(APP_DIR_NAME))
}

/// Default location of the config file
pub fn default_config_path() -> StorageResult<PathBuf> {
    Ok(get_app_config_dir()?.join("config.json"))
}

/// Read a file from disk
pub fn read_file(path: &Path) -> StorageResult<Vec<u8>> {
    fs::read(path).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Calculate SHA256 hash of data
pub fn calculate_sha256(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_calculate_sha256() {
        let data = b"hello world";
        let hash = calculate_sha256(data);
        assert_eq!(
            hash,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_read_missing_file_reports_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.bin");

        let err = read_file(&path).unwrap_err();
        assert!(err.to_string().contains("missing.bin"));
    }

    #[test]
    fn test_default_config_path_under_app_dir() {
        if let Ok(path) = default_config_path() {
            assert!(path.ends_with("com.ecgmonitor.app/config.json"));
        }
    }
}
