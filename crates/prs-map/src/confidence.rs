//! Confidence policy: display tiers and auto-acceptance.
//!
//! The tier thresholds and the auto-accept threshold are separate tunables.
//! They share a default of 0.7 but nothing derives one from the other.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Default lower bound of the high tier.
pub const DEFAULT_HIGH_THRESHOLD: f32 = 0.7;
/// Default lower bound of the medium tier.
pub const DEFAULT_MEDIUM_THRESHOLD: f32 = 0.4;
/// Default minimum score for automatic acceptance.
pub const DEFAULT_AUTO_ACCEPT_THRESHOLD: f32 = 0.7;

/// Confidence tier of a suggested mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    /// Below the medium threshold.
    Low,
    /// At or above the medium threshold, below high.
    Medium,
    /// At or above the high threshold.
    High,
}

impl ConfidenceLevel {
    /// What the operator is expected to do with a column in this tier.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::High => "suggestion can be accepted as is",
            Self::Medium => "check the suggested field",
            Self::Low => "pick a field by hand",
        }
    }

    /// Short lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// Thresholds for tiering and auto-acceptance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidencePolicy {
    /// Minimum score for [`ConfidenceLevel::High`] (default: 0.7).
    pub high: f32,
    /// Minimum score for [`ConfidenceLevel::Medium`] (default: 0.4).
    pub medium: f32,
    /// Minimum score for automatic acceptance (default: 0.7).
    pub auto_accept: f32,
}

impl Default for ConfidencePolicy {
    fn default() -> Self {
        Self {
            high: DEFAULT_HIGH_THRESHOLD,
            medium: DEFAULT_MEDIUM_THRESHOLD,
            auto_accept: DEFAULT_AUTO_ACCEPT_THRESHOLD,
        }
    }
}

impl ConfidencePolicy {
    /// Buckets a score into a tier. NaN is `Low`.
    #[must_use]
    pub fn classify(&self, score: f32) -> ConfidenceLevel {
        if score >= self.high {
            ConfidenceLevel::High
        } else if score >= self.medium {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }

    /// Returns true if a suggestion with this score may be accepted without review.
    #[must_use]
    pub fn is_auto_accept_eligible(&self, score: f32) -> bool {
        score >= self.auto_accept
    }

    /// Counts scores per tier.
    #[must_use]
    pub fn count_by_level<I>(&self, scores: I) -> BTreeMap<ConfidenceLevel, usize>
    where
        I: IntoIterator<Item = f32>,
    {
        let mut counts = BTreeMap::new();
        for score in scores {
            *counts.entry(self.classify(score)).or_insert(0) += 1;
        }
        counts
    }
}

/// Tier a score with the default thresholds.
pub fn classify_confidence(score: f32) -> ConfidenceLevel {
    ConfidencePolicy::default().classify(score)
}

/// Auto-accept check with the default threshold.
pub fn is_auto_accept_eligible(score: f32) -> bool {
    ConfidencePolicy::default().is_auto_accept_eligible(score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_resolve_upward() {
        assert_eq!(classify_confidence(0.7), ConfidenceLevel::High);
        assert_eq!(classify_confidence(0.4), ConfidenceLevel::Medium);
        assert_eq!(classify_confidence(0.39), ConfidenceLevel::Low);
        assert_eq!(classify_confidence(0.0), ConfidenceLevel::Low);
        assert_eq!(classify_confidence(1.0), ConfidenceLevel::High);
    }

    #[test]
    fn nan_is_low_and_never_auto_accepted() {
        assert_eq!(classify_confidence(f32::NAN), ConfidenceLevel::Low);
        assert!(!is_auto_accept_eligible(f32::NAN));
    }

    #[test]
    fn thresholds_are_independent() {
        let policy = ConfidencePolicy {
            auto_accept: 0.9,
            ..ConfidencePolicy::default()
        };
        assert_eq!(policy.classify(0.8), ConfidenceLevel::High);
        assert!(!policy.is_auto_accept_eligible(0.8));
        assert!(policy.is_auto_accept_eligible(0.9));
    }

    #[test]
    fn counts_by_level() {
        let counts = ConfidencePolicy::default().count_by_level([0.95, 0.7, 0.5, 0.1]);
        assert_eq!(counts.get(&ConfidenceLevel::High), Some(&2));
        assert_eq!(counts.get(&ConfidenceLevel::Medium), Some(&1));
        assert_eq!(counts.get(&ConfidenceLevel::Low), Some(&1));
    }
}
