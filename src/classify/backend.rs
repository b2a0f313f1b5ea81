// Inference engine abstraction
// Supports multiple model backends: exported dense weights now, TFLite later

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::classify::encoder::{EncodedBeat, EncodingError};
use crate::classify::model::ModelHandle;
use crate::classify::types::ScoreVector;
use crate::state::storage::StorageError;

/// Model backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EngineBackend {
    /// Dense layer + softmax loaded from a JSON weight export
    #[default]
    Linear,

    /// TensorFlow Lite flatbuffer (the on-device model format)
    /// Not linked into this build
    TfLite,
}

/// Errors that can occur while loading or running a model
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Backend not implemented: {0:?}")]
    BackendNotImplemented(EngineBackend),

    #[error("Model file error: {0}")]
    Storage(#[from] StorageError),

    #[error("Model file is not valid JSON: {0}")]
    ModelFormat(#[from] serde_json::Error),

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Model input has {actual} values, expected {expected}")]
    InputLength { expected: usize, actual: usize },

    #[error("Input encoding error: {0}")]
    Encoding(#[from] EncodingError),

    #[error("Model has been released")]
    Closed,
}

/// Narrow interface the monitor needs from a model
pub trait InferenceEngine {
    /// Score one encoded beat
    fn infer(&mut self, beat: &EncodedBeat) -> Result<ScoreVector, EngineError>;

    /// Short backend name for logs and traces
    fn name(&self) -> &str;

    /// Release any held model resources. Called once at shutdown.
    fn close(&mut self) {}
}

pub type BoxedEngine = Box<dyn InferenceEngine + Send>;

/// Open a model with the selected backend
pub fn open_engine(backend: EngineBackend, model_path: &Path) -> Result<BoxedEngine, EngineError> {
    match backend {
        EngineBackend::Linear => {
            let handle = ModelHandle::open(model_path)?;
            Ok(Box::new(handle))
        }
        EngineBackend::TfLite => Err(EngineError::BackendNotImplemented(backend)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::model::tests::{block_model, write_model};
    use tempfile::TempDir;

    #[test]
    fn test_open_linear_engine() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_model(&temp_dir, &block_model());

        let engine = open_engine(EngineBackend::Linear, &path).unwrap();
        assert_eq!(engine.name(), "linear");
    }

    #[test]
    fn test_tflite_not_available() {
        let result = open_engine(EngineBackend::TfLite, Path::new("model.tflite"));
        assert!(matches!(
            result,
            Err(EngineError::BackendNotImplemented(EngineBackend::TfLite))
        ));
    }

    #[test]
    fn test_backend_config_names() {
        let parsed: EngineBackend = serde_json::from_str("\"tflite\"").unwrap();
        assert_eq!(parsed, EngineBackend::TfLite);
        assert_eq!(EngineBackend::default(), EngineBackend::Linear);
    }
}
