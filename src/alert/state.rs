// Alert state machine
// Counts classified beats and maps the counters onto an alert level

use serde::{Deserialize, Serialize};

use crate::classify::BeatClass;

/// Severity shown by the status indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    /// No threshold reached
    #[default]
    Clear,
    /// Elevated abnormal beat count
    Orange,
    /// High abnormal beat count
    Red,
    /// Too many unclassifiable beats, electrode contact is suspect
    Grey,
}

impl AlertLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Clear => "CLEAR",
            AlertLevel::Orange => "ORANGE",
            AlertLevel::Red => "RED",
            AlertLevel::Grey => "GREY",
        }
    }
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How beats move the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AlertPolicy {
    /// Every non-Other beat increments `abnormal`, every Other beat increments
    /// `unknown`. Counters never reset.
    #[default]
    Counting,

    /// Normal and Other beats reset `abnormal` to zero, any other class
    /// increments it. `unknown` is not tracked.
    Resetting,
}

impl AlertPolicy {
    pub fn default_thresholds(&self) -> AlertThresholds {
        match self {
            AlertPolicy::Counting => AlertThresholds {
                orange: 5,
                red: 6,
                grey: Some(10),
            },
            AlertPolicy::Resetting => AlertThresholds {
                orange: 5,
                red: 10,
                grey: None,
            },
        }
    }
}

/// Counter values at which each level is raised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertThresholds {
    pub orange: u32,
    pub red: u32,
    /// Unknown-beat threshold; `None` disables the grey level
    #[serde(default)]
    pub grey: Option<u32>,
}

/// Partial thresholds from config, merged over a policy's defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AlertThresholdOverrides {
    pub orange: Option<u32>,
    pub red: Option<u32>,
    pub grey: Option<u32>,
}

impl AlertThresholdOverrides {
    /// Fill the missing fields from `policy`'s defaults
    pub fn resolve(&self, policy: AlertPolicy) -> AlertThresholds {
        let defaults = policy.default_thresholds();
        AlertThresholds {
            orange: self.orange.unwrap_or(defaults.orange),
            red: self.red.unwrap_or(defaults.red),
            grey: self.grey.or(defaults.grey),
        }
    }
}

/// Counters and current level for one monitoring session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertState {
    policy: AlertPolicy,
    thresholds: AlertThresholds,
    abnormal: u32,
    unknown: u32,
    level: AlertLevel,
}

impl AlertState {
    /// Fresh state with the policy's default thresholds
    pub fn new(policy: AlertPolicy) -> Self {
        Self::with_thresholds(policy, policy.default_thresholds())
    }

    pub fn with_thresholds(policy: AlertPolicy, thresholds: AlertThresholds) -> Self {
        AlertState {
            policy,
            thresholds,
            abnormal: 0,
            unknown: 0,
            level: AlertLevel::Clear,
        }
    }

    /// Feed one predicted class and return the resulting level
    pub fn observe(&mut self, predicted: BeatClass) -> AlertLevel {
        match self.policy {
            AlertPolicy::Counting => {
                if predicted == BeatClass::Other {
                    self.unknown = self.unknown.saturating_add(1);
                } else {
                    self.abnormal = self.abnormal.saturating_add(1);
                }
            }
            AlertPolicy::Resetting => {
                if predicted.is_abnormal() {
                    self.abnormal = self.abnormal.saturating_add(1);
                } else {
                    self.abnormal = 0;
                }
            }
        }

        self.level = self.evaluate();
        self.level
    }

    // Later checks override earlier ones, so RED wins over ORANGE and GREY
    // wins over both.
    fn evaluate(&self) -> AlertLevel {
        let t = &self.thresholds;
        let mut level = AlertLevel::Clear;
        if self.abnormal >= t.orange {
            level = AlertLevel::Orange;
        }
        if self.abnormal >= t.red {
            level = AlertLevel::Red;
        }
        if let Some(grey) = t.grey {
            if self.unknown >= grey {
                level = AlertLevel::Grey;
            }
        }
        level
    }

    pub fn abnormal(&self) -> u32 {
        self.abnormal
    }

    pub fn unknown(&self) -> u32 {
        self.unknown
    }

    pub fn level(&self) -> AlertLevel {
        self.level
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::BeatClass::*;

    fn feed(state: &mut AlertState, classes: &[BeatClass]) -> Vec<AlertLevel> {
        classes.iter().map(|c| state.observe(*c)).collect()
    }

    #[test]
    fn test_starts_clear() {
        let state = AlertState::new(AlertPolicy::Counting);
        assert_eq!(state.abnormal(), 0);
        assert_eq!(state.unknown(), 0);
        assert_eq!(state.level(), AlertLevel::Clear);
    }

    #[test]
    fn test_counting_orange_then_red() {
        let mut state = AlertState::new(AlertPolicy::Counting);
        let levels = feed(
            &mut state,
            &[Normal, Ventricular, Ventricular, Ventricular, Ventricular, Ventricular],
        );

        // Normal counts toward the abnormal total under this policy
        assert_eq!(levels[3], AlertLevel::Clear);
        assert_eq!(levels[4], AlertLevel::Orange);
        assert_eq!(levels[5], AlertLevel::Red);
        assert_eq!(state.abnormal(), 6);
        assert_eq!(state.unknown(), 0);
    }

    #[test]
    fn test_counting_never_resets() {
        let mut state = AlertState::new(AlertPolicy::Counting);
        feed(&mut state, &[Fusion; 6]);
        assert_eq!(state.level(), AlertLevel::Red);

        feed(&mut state, &[Other, Normal]);
        assert_eq!(state.abnormal(), 7);
        assert_eq!(state.unknown(), 1);
        assert_eq!(state.level(), AlertLevel::Red);
    }

    #[test]
    fn test_counting_grey_overrides() {
        let mut state = AlertState::new(AlertPolicy::Counting);
        feed(&mut state, &[Ventricular; 6]);
        let levels = feed(&mut state, &[Other; 10]);

        assert_eq!(levels[8], AlertLevel::Red);
        assert_eq!(levels[9], AlertLevel::Grey);
        assert_eq!(state.abnormal(), 6);
        assert_eq!(state.unknown(), 10);
    }

    #[test]
    fn test_counting_grey_alone() {
        let mut state = AlertState::new(AlertPolicy::Counting);
        let levels = feed(&mut state, &[Other; 10]);
        assert_eq!(levels[8], AlertLevel::Clear);
        assert_eq!(levels[9], AlertLevel::Grey);
    }

    #[test]
    fn test_resetting_resets_on_normal() {
        let mut state = AlertState::new(AlertPolicy::Resetting);
        let levels = feed(&mut state, &[Ventricular; 5]);
        assert_eq!(levels[4], AlertLevel::Orange);
        assert_eq!(state.abnormal(), 5);

        assert_eq!(state.observe(Normal), AlertLevel::Clear);
        assert_eq!(state.abnormal(), 0);
    }

    #[test]
    fn test_resetting_resets_on_other() {
        let mut state = AlertState::new(AlertPolicy::Resetting);
        feed(&mut state, &[Supraventricular; 3]);
        state.observe(Other);
        assert_eq!(state.abnormal(), 0);
        assert_eq!(state.unknown(), 0);
    }

    #[test]
    fn test_resetting_red_at_ten() {
        let mut state = AlertState::new(AlertPolicy::Resetting);
        let levels = feed(&mut state, &[Fusion; 10]);
        assert_eq!(levels[5], AlertLevel::Orange);
        assert_eq!(levels[8], AlertLevel::Orange);
        assert_eq!(levels[9], AlertLevel::Red);
    }

    #[test]
    fn test_resetting_never_grey() {
        let mut state = AlertState::new(AlertPolicy::Resetting);
        feed(&mut state, &[Other; 50]);
        assert_eq!(state.level(), AlertLevel::Clear);
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = AlertThresholds {
            orange: 2,
            red: 3,
            grey: Some(1),
        };
        let mut state = AlertState::with_thresholds(AlertPolicy::Counting, thresholds);
        assert_eq!(state.observe(Fusion), AlertLevel::Clear);
        assert_eq!(state.observe(Fusion), AlertLevel::Orange);
        assert_eq!(state.observe(Other), AlertLevel::Grey);
    }

    #[test]
    fn test_overrides_keep_policy_defaults() {
        let overrides = AlertThresholdOverrides {
            orange: Some(3),
            ..Default::default()
        };
        assert_eq!(
            overrides.resolve(AlertPolicy::Counting),
            AlertThresholds {
                orange: 3,
                red: 6,
                grey: Some(10),
            }
        );
        assert_eq!(overrides.resolve(AlertPolicy::Resetting).grey, None);
    }
}
