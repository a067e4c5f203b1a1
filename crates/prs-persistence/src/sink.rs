//! Persistence boundary (`SaveMappings`).
//!
//! The sink receives an already-compiled payload. A failed save is reported
//! as a structured [`SaveOutcome`]; nothing here touches the mapping
//! session, so the operator can retry without redoing any work.

use std::path::{Path, PathBuf};

use prs_model::{MappingPayload, SaveOutcome};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{PersistenceError, Result};
use crate::io::{normalize_id, read_json, write_json_atomic};

/// Current stored-mapping format version.
pub const CURRENT_FORMAT_VERSION: u32 = 1;

/// Destination for compiled mapping payloads.
pub trait MappingSink {
    /// Persist the payload for a source document.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistenceError`] describing the transport or storage failure.
    fn save_mappings(&self, source_id: &str, payload: &MappingPayload) -> Result<()>;
}

/// Save through a sink, translating failures into a [`SaveOutcome`].
pub fn save_with_outcome<S: MappingSink + ?Sized>(
    sink: &S,
    source_id: &str,
    payload: &MappingPayload,
) -> SaveOutcome {
    match sink.save_mappings(source_id, payload) {
        Ok(()) => SaveOutcome::ok(),
        Err(error) => {
            warn!(source_id, %error, "save failed");
            SaveOutcome::failed(error.user_message())
        }
    }
}

/// Payload as written to disk, with bookkeeping fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMapping {
    /// Source document identifier.
    pub source_id: String,
    /// RFC 3339 timestamp of the save.
    pub saved_at: String,
    /// Format version.
    #[serde(default = "default_version")]
    pub version: u32,
    /// The compiled payload. Kept nested: integer column keys must round-trip.
    pub payload: MappingPayload,
}

fn default_version() -> u32 {
    CURRENT_FORMAT_VERSION
}

/// Writes `<dir>/<source_id>.mapping.json` atomically.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    base_dir: PathBuf,
}

impl JsonFileSink {
    /// Create a sink rooted at `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Base directory of the sink.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path of the stored mapping for a source document.
    pub fn path_for(&self, source_id: &str) -> PathBuf {
        self.base_dir
            .join(format!("{}.mapping.json", normalize_id(source_id)))
    }

    /// Load a previously stored mapping.
    ///
    /// Returns `None` if no mapping exists.
    ///
    /// # Errors
    ///
    /// Read or parse failures, or a file written by a newer format version.
    pub fn load(&self, source_id: &str) -> Result<Option<StoredMapping>> {
        let path = self.path_for(source_id);
        if !path.exists() {
            return Ok(None);
        }
        let stored: StoredMapping = read_json(&path)?;
        if stored.version > CURRENT_FORMAT_VERSION {
            return Err(PersistenceError::UnsupportedVersion {
                found: stored.version,
                max_supported: CURRENT_FORMAT_VERSION,
                path,
            });
        }
        Ok(Some(stored))
    }
}

impl MappingSink for JsonFileSink {
    fn save_mappings(&self, source_id: &str, payload: &MappingPayload) -> Result<()> {
        let stored = StoredMapping {
            source_id: source_id.to_string(),
            saved_at: chrono::Utc::now().to_rfc3339(),
            version: CURRENT_FORMAT_VERSION,
            payload: payload.clone(),
        };
        let path = self.path_for(source_id);
        write_json_atomic(&path, &stored)?;
        info!(
            source_id,
            sections = payload.section_mappings.len(),
            columns = payload.mapped_count(),
            "Saved mappings to {}",
            path.display()
        );
        Ok(())
    }
}
