//! Data model for payroll register column mapping.
//!
//! This crate holds the types shared by the mapping engine, the persistence
//! adapters and the CLI:
//!
//! - **Taxonomy**: [`SectionKind`] and each section's target-field vocabulary
//! - **Input**: [`Extract`] and [`Classification`] as produced by the extraction engine
//! - **Decisions**: [`FieldChoice`], including the skip sentinel
//! - **Output**: [`MappingPayload`], [`HeaderMetadata`] and [`SaveOutcome`]

mod error;
mod extract;
mod field;
mod metadata;
mod payload;
mod section;

pub use error::{ModelError, Result};
pub use extract::{Classification, Extract};
pub use field::FieldChoice;
pub use metadata::HeaderMetadata;
pub use payload::{MappingPayload, SaveOutcome, SectionMapping};
pub use section::{SKIP_FIELD, SectionKind};
