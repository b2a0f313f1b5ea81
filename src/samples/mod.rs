// Sample data module
// CSV beat loading and cyclic playback

pub mod source;
pub mod types;

pub use source::{load_samples, LoadError, SampleSource};
pub use types::Sample;
