//! Extract provider boundary (`GetExtracts`).

use std::path::{Path, PathBuf};

use prs_model::Extract;
use tracing::info;

use crate::error::{PersistenceError, Result};
use crate::io::{normalize_id, read_json};

/// Source of per-section extracts for a document.
pub trait ExtractProvider {
    /// Fetch every extracted section of a source document.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistenceError`] when the extracts cannot be fetched;
    /// callers keep the affected sections in `no_data`.
    fn get_extracts(&self, source_id: &str) -> Result<Vec<Extract>>;
}

/// Reads `<dir>/<source_id>.json`, a JSON array of extracts.
#[derive(Debug, Clone)]
pub struct JsonExtractDir {
    base_dir: PathBuf,
}

impl JsonExtractDir {
    /// Create a provider rooted at `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Base directory of the provider.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path of the extract file for a source document.
    pub fn path_for(&self, source_id: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", normalize_id(source_id)))
    }
}

impl ExtractProvider for JsonExtractDir {
    fn get_extracts(&self, source_id: &str) -> Result<Vec<Extract>> {
        let path = self.path_for(source_id);
        if !path.exists() {
            return Err(PersistenceError::SourceNotFound {
                source_id: source_id.to_string(),
                path,
            });
        }
        let extracts: Vec<Extract> = read_json(&path)?;
        info!(source_id, sections = extracts.len(), "fetched extracts");
        Ok(extracts)
    }
}
