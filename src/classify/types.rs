// Beat classification types
// Defines the AAMI beat taxonomy and the per-inference score vector

use serde::{Deserialize, Serialize};

/// Number of beat classes the model scores
pub const CLASS_COUNT: usize = 5;

/// AAMI heartbeat categories
/// Label integers in the sample file and score vector indices both map onto
/// this ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BeatClass {
    /// N - normal and bundle branch block beats
    Normal,

    /// V - premature ventricular contraction, ventricular escape
    Ventricular,

    /// S - atrial/nodal premature and escape beats
    Supraventricular,

    /// F - fusion of ventricular and normal beats
    Fusion,

    /// Q - paced, unclassifiable, or otherwise unknown beats
    Other,
}

impl BeatClass {
    /// All classes in label order
    pub const ALL: [BeatClass; CLASS_COUNT] = [
        BeatClass::Normal,
        BeatClass::Ventricular,
        BeatClass::Supraventricular,
        BeatClass::Fusion,
        BeatClass::Other,
    ];

    /// Look up a class by label / score index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Position of this class in the taxonomy
    pub fn index(&self) -> usize {
        match self {
            BeatClass::Normal => 0,
            BeatClass::Ventricular => 1,
            BeatClass::Supraventricular => 2,
            BeatClass::Fusion => 3,
            BeatClass::Other => 4,
        }
    }

    /// Category name shown to the user
    pub fn as_str(&self) -> &'static str {
        match self {
            BeatClass::Normal => "Normal",
            BeatClass::Ventricular => "Ventricular",
            BeatClass::Supraventricular => "Supraventricular",
            BeatClass::Fusion => "Fusion",
            BeatClass::Other => "Other",
        }
    }

    /// Single-letter AAMI symbol
    pub fn symbol(&self) -> char {
        match self {
            BeatClass::Normal => 'N',
            BeatClass::Ventricular => 'V',
            BeatClass::Supraventricular => 'S',
            BeatClass::Fusion => 'F',
            BeatClass::Other => 'Q',
        }
    }

    /// Clinically abnormal beat types (excludes Normal and Other)
    pub fn is_abnormal(&self) -> bool {
        matches!(
            self,
            BeatClass::Ventricular | BeatClass::Supraventricular | BeatClass::Fusion
        )
    }
}

impl std::fmt::Display for BeatClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Model output: one score per class, in taxonomy order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreVector(pub [f32; CLASS_COUNT]);

impl ScoreVector {
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_round_trip() {
        for (i, class) in BeatClass::ALL.iter().enumerate() {
            assert_eq!(class.index(), i);
            assert_eq!(BeatClass::from_index(i), Some(*class));
        }
        assert_eq!(BeatClass::from_index(5), None);
    }

    #[test]
    fn test_names_match_taxonomy() {
        let names: Vec<&str> = BeatClass::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(
            names,
            vec!["Normal", "Ventricular", "Supraventricular", "Fusion", "Other"]
        );
    }

    #[test]
    fn test_abnormal_classes() {
        assert!(!BeatClass::Normal.is_abnormal());
        assert!(!BeatClass::Other.is_abnormal());
        assert!(BeatClass::Ventricular.is_abnormal());
        assert!(BeatClass::Fusion.is_abnormal());
    }

    #[test]
    fn test_symbols() {
        let symbols: String = BeatClass::ALL.iter().map(|c| c.symbol()).collect();
        assert_eq!(symbols, "NVSFQ");
    }
}
