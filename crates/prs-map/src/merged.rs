//! Merged-column detection.
//!
//! Flags columns whose sample values look like several data points run
//! together (`"REG 40.00 OT 5.00"`) rather than one atomic value. The result
//! is a warning for the operator together with a split preview; the column
//! itself is never modified here.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Default number of leading sample values inspected.
pub const DEFAULT_MAX_SAMPLES: usize = 5;
/// Default numeric token count that, together with a long value, signals a merge.
pub const DEFAULT_MIN_NUMERIC_TOKENS: usize = 3;
/// Default length (in characters) above which a value is considered too long.
pub const DEFAULT_MAX_ATOMIC_LEN: usize = 40;

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("valid number pattern"));

// code token, whitespace, number, whitespace, start of the next code
static CODE_AMOUNT_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Z]{2,}(?:[-_]?\d+)?\s+\d+(?:\.\d+)?\s+[A-Z]").expect("valid code pattern")
});

static CODE_AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Z]{2,}(?:[-_]?\d+)?\s+-?\d+(?:\.\d+)?").expect("valid segment pattern")
});

/// Heuristic detector with tunable thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergedColumnDetector {
    /// Number of leading sample values inspected.
    pub max_samples: usize,
    /// Numeric token count required (with a long value) to flag a merge.
    pub min_numeric_tokens: usize,
    /// Values longer than this many characters count as "too long".
    pub max_atomic_len: usize,
}

impl Default for MergedColumnDetector {
    fn default() -> Self {
        Self {
            max_samples: DEFAULT_MAX_SAMPLES,
            min_numeric_tokens: DEFAULT_MIN_NUMERIC_TOKENS,
            max_atomic_len: DEFAULT_MAX_ATOMIC_LEN,
        }
    }
}

/// Per-value signals computed by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueSignals {
    /// Count of decimal-number substrings.
    pub numeric_tokens: usize,
    /// True if a "code amount code" run was found.
    pub has_code_pattern: bool,
    /// True if the value exceeds the atomic length limit.
    pub is_too_long: bool,
}

impl MergedColumnDetector {
    /// Compute the signals for one value.
    pub fn signals(&self, value: &str) -> ValueSignals {
        ValueSignals {
            numeric_tokens: NUMBER.find_iter(value).count(),
            has_code_pattern: CODE_AMOUNT_CODE.is_match(value),
            is_too_long: value.chars().count() > self.max_atomic_len,
        }
    }

    /// Returns true if a single value looks like several merged data points.
    pub fn is_merged_value(&self, value: &str) -> bool {
        let signals = self.signals(value);
        (signals.numeric_tokens >= self.min_numeric_tokens && signals.is_too_long)
            || signals.has_code_pattern
    }

    /// Returns true as soon as one of the leading sample values looks merged.
    ///
    /// Empty input is never flagged.
    pub fn is_likely_merged<S: AsRef<str>>(&self, sample_values: &[S]) -> bool {
        sample_values
            .iter()
            .take(self.max_samples)
            .any(|value| self.is_merged_value(value.as_ref()))
    }

    /// Pieces a "split" action would produce for a merged value.
    ///
    /// Prefers `CODE amount` segments; falls back to the individual numeric
    /// tokens; a value with fewer than two pieces is returned whole.
    pub fn split_preview(&self, value: &str) -> Vec<String> {
        let segments: Vec<String> = CODE_AMOUNT
            .find_iter(value)
            .map(|m| m.as_str().trim().to_string())
            .collect();
        if segments.len() >= 2 {
            return segments;
        }
        let numbers: Vec<String> = NUMBER
            .find_iter(value)
            .map(|m| m.as_str().to_string())
            .collect();
        if numbers.len() >= 2 {
            return numbers;
        }
        vec![value.trim().to_string()]
    }
}

/// Detect a merged column using the default thresholds.
pub fn is_likely_merged<S: AsRef<str>>(sample_values: &[S]) -> bool {
    MergedColumnDetector::default().is_likely_merged(sample_values)
}
