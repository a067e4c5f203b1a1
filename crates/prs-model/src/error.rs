//! Error types for model validation.

use thiserror::Error;

use crate::section::SectionKind;

/// Structural problems found in an [`Extract`](crate::Extract).
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ModelError {
    /// A sample row does not have one cell per header.
    #[error("{section}: sample row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        /// Section of the offending extract.
        section: SectionKind,
        /// Zero-based sample row index.
        row: usize,
        /// Number of headers.
        expected: usize,
        /// Number of cells actually present.
        found: usize,
    },

    /// A suggested classification points past the last column.
    #[error("{section}: classification for column {column} but only {columns} columns")]
    ClassificationOutOfRange {
        /// Section of the offending extract.
        section: SectionKind,
        /// Column index referenced by the classification.
        column: usize,
        /// Number of columns in the extract.
        columns: usize,
    },

    /// A confidence score outside `[0, 1]` (or NaN).
    #[error("{section}: column {column} has confidence {confidence} outside [0, 1]")]
    ConfidenceOutOfRange {
        /// Section of the offending extract.
        section: SectionKind,
        /// Column index of the classification.
        column: usize,
        /// The rejected score.
        confidence: f32,
    },
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
