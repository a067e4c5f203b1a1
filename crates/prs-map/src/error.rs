//! Error types for mapping operations.
//!
//! Every mutation reports its outcome through [`MappingError`] instead of
//! panicking; a failed operation leaves the state untouched.

use prs_model::SectionKind;
use thiserror::Error;

/// Errors from mapping operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MappingError {
    /// No extract has been loaded for the section.
    #[error("No data loaded for section {0}")]
    SectionNotLoaded(SectionKind),

    /// Column index not present in the section's extract.
    #[error("Column {column} not found in section {section}")]
    ColumnNotFound {
        /// Section that was addressed.
        section: SectionKind,
        /// Column index that was addressed.
        column: usize,
    },

    /// Field name outside the section's vocabulary.
    #[error("Field '{field}' is not a target field of section {section}")]
    UnknownField {
        /// Section that was addressed.
        section: SectionKind,
        /// The rejected field name.
        field: String,
    },

    /// Neither a chosen nor a suggested field is available to confirm.
    #[error("Column {column} in section {section} has no field to confirm")]
    NothingToConfirm {
        /// Section that was addressed.
        section: SectionKind,
        /// Column index that was addressed.
        column: usize,
    },

    /// Section confirmation requested for a section without data.
    #[error("Section {0} has no data and cannot be confirmed")]
    NoData(SectionKind),

    /// Column edit requested on an already-confirmed section.
    #[error("Section {0} is already confirmed")]
    SectionConfirmed(SectionKind),
}

impl MappingError {
    /// Get the section associated with this error.
    pub fn section(&self) -> SectionKind {
        match self {
            Self::SectionNotLoaded(s) | Self::NoData(s) | Self::SectionConfirmed(s) => *s,
            Self::ColumnNotFound { section, .. }
            | Self::UnknownField { section, .. }
            | Self::NothingToConfirm { section, .. } => *section,
        }
    }

    /// Get the column index associated with this error, if any.
    pub fn column(&self) -> Option<usize> {
        match self {
            Self::ColumnNotFound { column, .. } | Self::NothingToConfirm { column, .. } => {
                Some(*column)
            }
            _ => None,
        }
    }

    /// Returns true for "nothing loaded at this address" outcomes.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::SectionNotLoaded(_) | Self::ColumnNotFound { .. })
    }
}

/// Result type for mapping operations.
pub type Result<T> = std::result::Result<T, MappingError>;
