// Beat classification module
// Input encoding, model backends, and the argmax decision

pub mod backend;
pub mod decision;
pub mod encoder;
pub mod model;
pub mod types;

pub use backend::{open_engine, BoxedEngine, EngineBackend, EngineError, InferenceEngine};
pub use decision::{decide, Decision};
pub use encoder::{encode, EncodedBeat, EncodingError, Endianness, BEAT_LENGTH};
pub use model::{LinearModel, LinearModelFile, ModelHandle};
pub use types::{BeatClass, ScoreVector, CLASS_COUNT};
