//! Mapping compiler.
//!
//! Reduces the store to the minimal payload sent to the persistence
//! boundary. Total and side-effect free: incomplete data is omitted, never
//! reported as an error.

use std::collections::BTreeMap;

use prs_model::{HeaderMetadata, MappingPayload, SectionMapping};

use crate::store::MappingStore;
use crate::workflow::SectionWorkflow;

/// Compile confirmed, non-skip mappings of every section with data.
///
/// Sections contributing no entries are left out of the payload entirely.
pub fn compile(
    store: &MappingStore,
    workflow: &SectionWorkflow,
    header: &HeaderMetadata,
    remember: bool,
) -> MappingPayload {
    let mut section_mappings = BTreeMap::new();
    for section in workflow.sections_with_data() {
        let entries: SectionMapping = store
            .columns(section)
            .filter_map(|mapping| {
                mapping
                    .mapped_field()
                    .map(|field| (mapping.column_index, field.to_string()))
            })
            .collect();
        if !entries.is_empty() {
            section_mappings.insert(section, entries);
        }
    }
    MappingPayload {
        header_metadata: header.clone(),
        section_mappings,
        remember_for_similar_files: remember,
    }
}
