//! Single-operator mapping session.
//!
//! [`MappingSession`] ties the store, the section workflow, the confidence
//! policy and the merged-column detector together behind one owner with
//! exclusive mutation methods.

use std::collections::BTreeMap;

use prs_model::{Extract, FieldChoice, HeaderMetadata, MappingPayload, ModelError, SectionKind};
use tracing::{info, warn};

use crate::compile::compile;
use crate::confidence::{ConfidenceLevel, ConfidencePolicy};
use crate::error::{MappingError, Result};
use crate::merged::MergedColumnDetector;
use crate::store::MappingStore;
use crate::workflow::{SectionStatus, SectionTransition, SectionWorkflow};

/// Outcome of loading a batch of extracts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    /// Sections seeded from an extract.
    pub loaded: Vec<SectionKind>,
    /// Extracts rejected as malformed; their sections keep their status.
    pub rejected: Vec<ModelError>,
    /// Extracts ignored because their section is already confirmed.
    pub ignored: Vec<SectionKind>,
}

/// In-memory state of one mapping session.
#[derive(Debug, Clone, Default)]
pub struct MappingSession {
    policy: ConfidencePolicy,
    detector: MergedColumnDetector,
    store: MappingStore,
    workflow: SectionWorkflow,
    extracts: BTreeMap<SectionKind, Extract>,
    header: HeaderMetadata,
}

impl MappingSession {
    /// Create a session with default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom confidence policy.
    #[must_use]
    pub fn with_policy(mut self, policy: ConfidencePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Use a custom merged-column detector.
    #[must_use]
    pub fn with_detector(mut self, detector: MergedColumnDetector) -> Self {
        self.detector = detector;
        self
    }

    /// Validate and load extracts, seeding the store and moving sections to pending.
    ///
    /// A malformed extract is rejected and its section keeps its status. An
    /// extract for a confirmed section is ignored. Reloading a pending
    /// section replaces its mappings. The first pending section becomes
    /// active if no pending section is active yet.
    pub fn load_extracts<I>(&mut self, extracts: I) -> LoadReport
    where
        I: IntoIterator<Item = Extract>,
    {
        let mut report = LoadReport::default();
        for extract in extracts {
            let section = extract.section_id;
            if let Err(error) = extract.validate() {
                warn!(%section, %error, "rejected extract");
                report.rejected.push(error);
                continue;
            }
            if self.workflow.status(section) == SectionStatus::Confirmed {
                warn!(%section, "extract ignored, section already confirmed");
                report.ignored.push(section);
                continue;
            }
            self.seed(&extract);
            self.workflow.mark_loaded(section);
            self.extracts.insert(section, extract);
            if !report.loaded.contains(&section) {
                report.loaded.push(section);
            }
        }
        let active = self.workflow.activate_first_pending();
        info!(
            loaded = report.loaded.len(),
            rejected = report.rejected.len(),
            active = active.map(|kind| kind.as_str()),
            "extracts loaded"
        );
        report
    }

    fn seed(&mut self, extract: &Extract) {
        let section = extract.section_id;
        self.store.clear_section(section);
        self.store.ensure_section(section);
        for (index, header) in extract.headers.iter().enumerate() {
            let (field, confidence) = extract
                .suggestion(index)
                .map_or((None, 0.0), |c| (c.field.clone(), c.confidence));
            self.store
                .set_suggested(section, index, header.clone(), field, confidence);
        }
    }

    /// Loaded extract of a section.
    pub fn extract(&self, section: SectionKind) -> Option<&Extract> {
        self.extracts.get(&section)
    }

    /// Read access to the mapping store.
    pub fn store(&self) -> &MappingStore {
        &self.store
    }

    /// Read access to the section workflow.
    pub fn workflow(&self) -> &SectionWorkflow {
        &self.workflow
    }

    /// The confidence policy in use.
    pub fn policy(&self) -> &ConfidencePolicy {
        &self.policy
    }

    /// The merged-column detector in use.
    pub fn detector(&self) -> &MergedColumnDetector {
        &self.detector
    }

    /// Currently active section.
    pub fn active_section(&self) -> Option<SectionKind> {
        self.workflow.active()
    }

    /// Navigate to a section.
    pub fn set_active(&mut self, section: SectionKind) {
        self.workflow.set_active(section);
    }

    /// Tier of a column's suggestion.
    pub fn confidence_level(&self, section: SectionKind, column: usize) -> Option<ConfidenceLevel> {
        self.store
            .get(section, column)
            .map(|mapping| self.policy.classify(mapping.confidence))
    }

    /// Number of columns per confidence tier.
    pub fn confidence_counts(&self, section: SectionKind) -> BTreeMap<ConfidenceLevel, usize> {
        self.policy
            .count_by_level(self.store.columns(section).map(|mapping| mapping.confidence))
    }

    /// Returns true if the column's sample values look merged.
    pub fn is_column_merged(&self, section: SectionKind, column: usize) -> bool {
        self.extracts
            .get(&section)
            .is_some_and(|extract| self.detector.is_likely_merged(&extract.column_samples(column)))
    }

    /// Column indices of a section flagged by the merged-column detector.
    pub fn merged_columns(&self, section: SectionKind) -> Vec<usize> {
        let Some(extract) = self.extracts.get(&section) else {
            return Vec::new();
        };
        (0..extract.column_count())
            .filter(|column| {
                self.detector
                    .is_likely_merged(&extract.column_samples(*column))
            })
            .collect()
    }

    /// Pieces a split would produce for a merged column.
    ///
    /// Uses the first sample value that looks merged; `None` when the column
    /// is not flagged.
    pub fn split_preview(&self, section: SectionKind, column: usize) -> Option<Vec<String>> {
        let extract = self.extracts.get(&section)?;
        let samples = extract.column_samples(column);
        if !self.detector.is_likely_merged(&samples) {
            return None;
        }
        samples
            .into_iter()
            .find(|value| self.detector.is_merged_value(value))
            .map(|value| self.detector.split_preview(value))
    }

    /// Set an explicit target field on a column of a pending section.
    ///
    /// # Errors
    ///
    /// See [`MappingStore::set_confirmed_field`]; additionally
    /// `SectionConfirmed` once the section is confirmed.
    pub fn set_confirmed_field(
        &mut self,
        section: SectionKind,
        column: usize,
        field: &str,
    ) -> Result<()> {
        self.ensure_editable(section)?;
        self.store.set_confirmed_field(section, column, field)
    }

    /// Confirm one column of a pending section.
    ///
    /// # Errors
    ///
    /// See [`MappingStore::confirm`]; additionally `SectionConfirmed`.
    pub fn confirm_column(&mut self, section: SectionKind, column: usize) -> Result<FieldChoice> {
        self.ensure_editable(section)?;
        self.store.confirm(section, column)
    }

    /// Auto-accept every eligible column of a pending section.
    ///
    /// # Errors
    ///
    /// `SectionNotLoaded` or `SectionConfirmed`.
    pub fn confirm_all_above_threshold(&mut self, section: SectionKind) -> Result<usize> {
        self.ensure_editable(section)?;
        let policy = self.policy;
        self.store.confirm_all_above_threshold(section, &policy)
    }

    /// Seed unconfirmed choices from a remembered mapping.
    ///
    /// # Errors
    ///
    /// `SectionNotLoaded` or `SectionConfirmed`.
    pub fn apply_template(
        &mut self,
        section: SectionKind,
        fields: &BTreeMap<usize, String>,
    ) -> Result<usize> {
        self.ensure_editable(section)?;
        let applied = self.store.apply_fields(section, fields)?;
        info!(%section, applied, "applied remembered mapping");
        Ok(applied)
    }

    /// Confirm a section (see [`SectionWorkflow::confirm_section`]).
    ///
    /// # Errors
    ///
    /// `NoData` for a section without an extract.
    pub fn confirm_section(&mut self, section: SectionKind) -> Result<SectionTransition> {
        self.workflow.confirm_section(section, &mut self.store)
    }

    /// Confirm the active section, if there is one.
    ///
    /// # Errors
    ///
    /// `NoData` if the active section has no extract.
    pub fn confirm_active_section(&mut self) -> Result<Option<SectionTransition>> {
        match self.workflow.active() {
            Some(section) => self.confirm_section(section).map(Some),
            None => Ok(None),
        }
    }

    /// Returns true if every section with data is confirmed.
    pub fn is_complete(&self) -> bool {
        self.workflow.is_complete()
    }

    /// Header metadata.
    pub fn header(&self) -> &HeaderMetadata {
        &self.header
    }

    /// Mutable header metadata; edits are independent of column mappings.
    pub fn header_mut(&mut self) -> &mut HeaderMetadata {
        &mut self.header
    }

    /// Compile the current state into a payload. Does not mutate the session.
    pub fn compile(&self, remember: bool) -> MappingPayload {
        compile(&self.store, &self.workflow, &self.header, remember)
    }

    fn ensure_editable(&self, section: SectionKind) -> Result<()> {
        match self.workflow.status(section) {
            SectionStatus::NoData => Err(MappingError::SectionNotLoaded(section)),
            SectionStatus::Confirmed => Err(MappingError::SectionConfirmed(section)),
            SectionStatus::Pending => Ok(()),
        }
    }
}
