// Dense-layer model artifact
// Loads exported classifier weights and holds them open for the monitor's lifetime

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::classify::backend::{EngineError, InferenceEngine};
use crate::classify::encoder::{EncodedBeat, BEAT_LENGTH};
use crate::classify::types::{ScoreVector, CLASS_COUNT};
use crate::state::storage;

/// Artifact format version this build understands
pub const MODEL_FORMAT_VERSION: u32 = 1;

/// On-disk JSON model: one weight row and one bias per class
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModelFile {
    pub version: u32,
    pub input_length: usize,
    pub weights: Vec<Vec<f32>>,
    pub bias: Vec<f32>,
}

/// Validated dense layer followed by softmax
#[derive(Debug, Clone)]
pub struct LinearModel {
    weights: Vec<Vec<f32>>,
    bias: [f32; CLASS_COUNT],
}

impl LinearModel {
    pub fn from_file(file: LinearModelFile) -> Result<Self, EngineError> {
        if file.version != MODEL_FORMAT_VERSION {
            return Err(EngineError::InvalidModel(format!(
                "unsupported format version {}",
                file.version
            )));
        }
        if file.input_length != BEAT_LENGTH {
            return Err(EngineError::InvalidModel(format!(
                "model expects {} inputs, monitor produces {}",
                file.input_length, BEAT_LENGTH
            )));
        }
        if file.weights.len() != CLASS_COUNT {
            return Err(EngineError::InvalidModel(format!(
                "expected {} weight rows, found {}",
                CLASS_COUNT,
                file.weights.len()
            )));
        }
        if let Some(row) = file.weights.iter().find(|row| row.len() != BEAT_LENGTH) {
            return Err(EngineError::InvalidModel(format!(
                "weight row has {} entries, expected {}",
                row.len(),
                BEAT_LENGTH
            )));
        }
        let bias: [f32; CLASS_COUNT] = file.bias.as_slice().try_into().map_err(|_| {
            EngineError::InvalidModel(format!(
                "expected {} bias terms, found {}",
                CLASS_COUNT,
                file.bias.len()
            ))
        })?;

        Ok(LinearModel {
            weights: file.weights,
            bias,
        })
    }

    /// Class probabilities for one beat
    pub fn predict(&self, features: &[f32]) -> Result<ScoreVector, EngineError> {
        if features.len() != BEAT_LENGTH {
            return Err(EngineError::InputLength {
                expected: BEAT_LENGTH,
                actual: features.len(),
            });
        }

        let mut logits = [0f32; CLASS_COUNT];
        for (class, row) in self.weights.iter().enumerate() {
            let dot: f32 = row.iter().zip(features).map(|(w, x)| w * x).sum();
            logits[class] = dot + self.bias[class];
        }

        Ok(ScoreVector(softmax(logits)))
    }
}

fn softmax(logits: [f32; CLASS_COUNT]) -> [f32; CLASS_COUNT] {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mut out = logits.map(|l| (l - max).exp());
    let sum: f32 = out.iter().sum();
    if sum > 0.0 {
        for p in out.iter_mut() {
            *p /= sum;
        }
    }
    out
}

/// Open model resource
///
/// Released exactly once, either by an explicit `close` or when dropped.
pub struct ModelHandle {
    path: PathBuf,
    sha256: String,
    model: Option<LinearModel>,
}

impl ModelHandle {
    /// Load and validate a model artifact
    pub fn open(path: &Path) -> Result<Self, EngineError> {
        let data = storage::read_file(path)?;
        let sha256 = storage::calculate_sha256(&data);
        let file: LinearModelFile = serde_json::from_slice(&data)?;
        let model = LinearModel::from_file(file)?;

        log::info!(
            "Opened model {} (sha256 {})",
            path.display(),
            &sha256[..12]
        );

        Ok(ModelHandle {
            path: path.to_path_buf(),
            sha256,
            model: Some(model),
        })
    }

    /// SHA-256 of the artifact bytes
    pub fn sha256(&self) -> &str {
        &self.sha256
    }

    pub fn is_open(&self) -> bool {
        self.model.is_some()
    }

    /// Release the model. Returns false if it was already released.
    pub fn release(&mut self) -> bool {
        match self.model.take() {
            Some(_) => {
                log::info!("Released model {}", self.path.display());
                true
            }
            None => false,
        }
    }
}

impl InferenceEngine for ModelHandle {
    fn infer(&mut self, beat: &EncodedBeat) -> Result<ScoreVector, EngineError> {
        let model = self.model.as_ref().ok_or(EngineError::Closed)?;
        let features = beat.decode()?;
        model.predict(&features)
    }

    fn name(&self) -> &str {
        "linear"
    }

    fn close(&mut self) {
        self.release();
    }
}

impl Drop for ModelHandle {
    fn drop(&mut self) {
        self.release();
    }
}
