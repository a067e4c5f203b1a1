//! Column-to-field mapping engine for payroll register extracts.
//!
//! The extraction engine suggests a target field and a confidence score for
//! every raw column. This crate decides what happens next:
//!
//! - **Confidence policy** (`confidence`): high/medium/low tiers and auto-acceptance
//! - **Merged-column detection** (`merged`): flags columns holding several values
//! - **Mapping store** (`store`): per-column suggested/chosen/confirmed state
//! - **Section workflow** (`workflow`): `no_data → pending → confirmed` and the active section
//! - **Compiler** (`compile`): the minimal payload handed to persistence
//!
//! # Example
//!
//! ```
//! use prs_map::MappingSession;
//! use prs_model::{Classification, Extract, SectionKind};
//!
//! let extract = Extract::new(SectionKind::Earnings, vec!["Code".into(), "Gross".into()])
//!     .with_row(vec!["REG".into(), "1200.00".into()])
//!     .with_suggestion(0, Classification::new("earning_code", 0.93))
//!     .with_suggestion(1, Classification::new("gross_pay", 0.55));
//!
//! let mut session = MappingSession::new();
//! session.load_extracts([extract]);
//! assert_eq!(session.active_section(), Some(SectionKind::Earnings));
//!
//! // Only the 0.93 suggestion is accepted automatically.
//! assert_eq!(session.confirm_all_above_threshold(SectionKind::Earnings), Ok(1));
//!
//! // The 0.55 suggestion needs an explicit decision.
//! session.set_confirmed_field(SectionKind::Earnings, 1, "gross_pay").unwrap();
//! session.confirm_section(SectionKind::Earnings).unwrap();
//!
//! let payload = session.compile(false);
//! assert_eq!(payload.mapped_count(), 2);
//! ```

mod compile;
mod confidence;
mod error;
mod merged;
mod session;
mod store;
mod workflow;

pub use compile::compile;
pub use confidence::{
    ConfidenceLevel, ConfidencePolicy, DEFAULT_AUTO_ACCEPT_THRESHOLD, DEFAULT_HIGH_THRESHOLD,
    DEFAULT_MEDIUM_THRESHOLD, classify_confidence, is_auto_accept_eligible,
};
pub use error::{MappingError, Result};
pub use merged::{
    DEFAULT_MAX_ATOMIC_LEN, DEFAULT_MAX_SAMPLES, DEFAULT_MIN_NUMERIC_TOKENS, MergedColumnDetector,
    ValueSignals, is_likely_merged,
};
pub use session::{LoadReport, MappingSession};
pub use store::{ColumnMapping, ColumnStatus, MappingStore, MappingSummary};
pub use workflow::{SectionStatus, SectionTransition, SectionWorkflow};
