// Sample types
use serde::{Deserialize, Serialize};

use crate::classify::BeatClass;

/// One labelled beat segment from the sample file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Signal values in file order
    pub features: Vec<f32>,

    /// Ground-truth class from the trailing label column
    pub label: BeatClass,
}

impl Sample {
    pub fn new(features: Vec<f32>, label: BeatClass) -> Self {
        Sample { features, label }
    }
}
