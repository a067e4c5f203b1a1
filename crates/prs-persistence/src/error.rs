//! Persistence error types.
//!
//! All boundary operations return structured errors that provide
//! user-friendly messages and optional remediation hints.

use std::path::PathBuf;
use thiserror::Error;

/// Boundary operation error.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PersistenceError {
    /// File I/O error.
    #[error("Failed to {operation} file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No extracts exist for the requested source document.
    #[error("No extracts found for source '{source_id}'")]
    SourceNotFound { source_id: String, path: PathBuf },

    /// File content is not the expected JSON shape.
    #[error("Invalid file format: {path}")]
    InvalidFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Stored file written by a newer format version.
    #[error("File version {found} is not supported (maximum: {max_supported})")]
    UnsupportedVersion {
        found: u32,
        max_supported: u32,
        path: PathBuf,
    },

    /// Serialization error.
    #[error("Failed to serialize mapping data")]
    Serialization {
        #[source]
        source: serde_json::Error,
    },

    /// Atomic write failed (temp file couldn't be renamed).
    #[error("Failed to complete save operation")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PersistenceError {
    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Io {
                operation, path, ..
            } => {
                format!("Could not {} the file at {}", operation, path.display())
            }
            Self::SourceNotFound { source_id, path } => {
                format!(
                    "No extracted sections were found for '{}' (looked for {}).",
                    source_id,
                    path.display()
                )
            }
            Self::InvalidFormat { path, source } => {
                format!("The file at {} could not be read: {}", path.display(), source)
            }
            Self::UnsupportedVersion {
                found,
                max_supported,
                ..
            } => {
                format!(
                    "This file was written by a newer version (file version {}, \
                    this version supports up to {}).",
                    found, max_supported
                )
            }
            Self::Serialization { .. } => {
                "An error occurred while preparing the mapping data.".to_string()
            }
            Self::AtomicWriteFailed { target_path, .. } => {
                format!(
                    "Could not save the file to {}. Please check disk space and permissions.",
                    target_path.display()
                )
            }
        }
    }

    /// Get a suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::Io { operation, .. } => {
                if *operation == "read" {
                    Some("Check that the file exists and you have permission to read it.".into())
                } else {
                    Some("Check that you have permission to write to this location.".into())
                }
            }
            Self::SourceNotFound { .. } => {
                Some("Run extraction for the document first, then retry.".into())
            }
            Self::InvalidFormat { .. } => {
                Some("Re-run extraction or restore the file from a backup.".into())
            }
            Self::UnsupportedVersion { .. } => Some("Update to the latest version.".into()),
            Self::Serialization { .. } => None,
            Self::AtomicWriteFailed { .. } => {
                Some("Free up disk space or save to a different location, then retry.".into())
            }
        }
    }
}

/// Result type alias for persistence operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;
