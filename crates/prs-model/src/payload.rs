//! Output handed to the persistence boundary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::metadata::HeaderMetadata;
use crate::section::SectionKind;

/// Confirmed mappings of one section: column index to target field.
pub type SectionMapping = BTreeMap<usize, String>;

/// Minimal, column-index-keyed mapping payload.
///
/// Contains only confirmed, non-skip entries. A section with no qualifying
/// entries is absent rather than present and empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingPayload {
    /// Header metadata, verbatim.
    pub header_metadata: HeaderMetadata,
    /// Per-section confirmed mappings.
    pub section_mappings: BTreeMap<SectionKind, SectionMapping>,
    /// Whether the mapping should be remembered for similarly-shaped files.
    pub remember_for_similar_files: bool,
}

impl MappingPayload {
    /// Mapping of a single section, if it contributed any entries.
    pub fn section(&self, kind: SectionKind) -> Option<&SectionMapping> {
        self.section_mappings.get(&kind)
    }

    /// Total number of mapped columns across all sections.
    pub fn mapped_count(&self) -> usize {
        self.section_mappings.values().map(BTreeMap::len).sum()
    }

    /// Returns true if no section contributed entries.
    pub fn is_empty(&self) -> bool {
        self.section_mappings.is_empty()
    }
}

/// Structured result of a save attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveOutcome {
    /// True if the payload was persisted.
    pub success: bool,
    /// Failure description when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SaveOutcome {
    /// A successful save.
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    /// A failed save with a message.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}
