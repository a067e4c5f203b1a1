//! Boundary adapters for payroll register mapping.
//!
//! - [`ExtractProvider`] fetches a document's per-section extracts
//! - [`MappingSink`] persists a compiled [`MappingPayload`](prs_model::MappingPayload)
//! - [`TemplateStore`] remembers confirmed mappings for similarly-shaped files
//!
//! The bundled implementations are file based: extracts are read from a
//! JSON file per source document and payloads are written atomically next
//! to them.

mod error;
mod hash;
mod io;
mod provider;
mod sink;
mod templates;

pub use error::{PersistenceError, Result};
pub use hash::{header_fingerprint, normalize_header};
pub use provider::{ExtractProvider, JsonExtractDir};
pub use sink::{
    CURRENT_FORMAT_VERSION, JsonFileSink, MappingSink, StoredMapping, save_with_outcome,
};
pub use templates::{DEFAULT_MIN_SIMILARITY, SectionTemplate, TemplateMatch, TemplateStore};
