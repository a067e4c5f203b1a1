//! Operator/engine choice of target field for a column.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::section::SKIP_FIELD;

/// An explicit target-field decision.
///
/// `Skip` is a real decision ("do not map this column"), distinct from the
/// absence of a decision, which is modelled as `Option::<FieldChoice>::None`.
/// Serialized as a plain string, with the skip sentinel spelled `"skip"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldChoice {
    /// Intentionally not mapped.
    Skip,
    /// Mapped to a canonical target field.
    Field(String),
}

impl FieldChoice {
    /// Builds a choice from raw input, recognising the skip sentinel.
    ///
    /// Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.eq_ignore_ascii_case(SKIP_FIELD) {
            Some(Self::Skip)
        } else {
            Some(Self::Field(trimmed.to_string()))
        }
    }

    /// Returns true for the skip sentinel.
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::Skip)
    }

    /// Returns the mapped field name, or `None` for skip.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Skip => None,
            Self::Field(name) => Some(name),
        }
    }

    /// Wire representation.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Skip => SKIP_FIELD,
            Self::Field(name) => name,
        }
    }
}

impl From<String> for FieldChoice {
    fn from(value: String) -> Self {
        if value == SKIP_FIELD {
            Self::Skip
        } else {
            Self::Field(value)
        }
    }
}

impl From<FieldChoice> for String {
    fn from(value: FieldChoice) -> Self {
        match value {
            FieldChoice::Skip => SKIP_FIELD.to_string(),
            FieldChoice::Field(name) => name,
        }
    }
}

impl fmt::Display for FieldChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
