//! Mapping state store.
//!
//! Owns the per-section, per-column mapping records of one session. The
//! store is seeded from loaded extracts and then mutated only through the
//! methods below; every method reports a [`MappingError`] instead of
//! panicking when the addressed column does not exist.

use std::collections::BTreeMap;

use prs_model::{FieldChoice, SectionKind};
use tracing::{debug, warn};

use crate::confidence::ConfidencePolicy;
use crate::error::{MappingError, Result};

/// Mapping record of one column.
///
/// Invariant: `confirmed` implies `confirmed_field.is_some()`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMapping {
    /// Physical column index in the extract.
    pub column_index: usize,
    /// Raw header text (may be blank or repeated).
    pub source_header: String,
    /// Engine-suggested target field.
    pub suggested_field: Option<String>,
    /// Engine confidence for the suggestion.
    pub confidence: f32,
    /// Explicit choice made by the operator or the auto-accept pass.
    pub confirmed_field: Option<FieldChoice>,
    /// Whether the choice has been confirmed.
    pub confirmed: bool,
}

impl ColumnMapping {
    fn new(
        column_index: usize,
        source_header: String,
        suggested_field: Option<String>,
        confidence: f32,
    ) -> Self {
        Self {
            column_index,
            source_header,
            suggested_field,
            confidence,
            confirmed_field: None,
            confirmed: false,
        }
    }

    /// The field that confirmation would lock in: the explicit choice, else the suggestion.
    pub fn effective_field(&self) -> Option<FieldChoice> {
        self.confirmed_field
            .clone()
            .or_else(|| self.suggested_field.clone().map(FieldChoice::Field))
    }

    /// Field name that ends up in the compiled payload, if any.
    pub fn mapped_field(&self) -> Option<&str> {
        if self.confirmed {
            self.confirmed_field.as_ref().and_then(FieldChoice::field)
        } else {
            None
        }
    }

    /// Current review status.
    pub fn status(&self) -> ColumnStatus {
        match (&self.confirmed_field, self.confirmed) {
            (Some(FieldChoice::Skip), true) => ColumnStatus::Skipped,
            (Some(_), true) => ColumnStatus::Confirmed,
            (Some(_), false) => ColumnStatus::Chosen,
            (None, _) if self.suggested_field.is_some() => ColumnStatus::Suggested,
            (None, _) => ColumnStatus::Unmapped,
        }
    }
}

/// Review status of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnStatus {
    /// Confirmed to a target field.
    Confirmed,
    /// Confirmed as intentionally unmapped.
    Skipped,
    /// A field was chosen but not yet confirmed.
    Chosen,
    /// Only an engine suggestion exists.
    Suggested,
    /// Neither a choice nor a suggestion.
    Unmapped,
}

impl ColumnStatus {
    /// Short lowercase label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Skipped => "skipped",
            Self::Chosen => "chosen",
            Self::Suggested => "suggested",
            Self::Unmapped => "unmapped",
        }
    }
}

/// Summary of mapping counts for a section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MappingSummary {
    /// Number of columns.
    pub total: usize,
    /// Columns confirmed to a target field.
    pub confirmed: usize,
    /// Columns confirmed as skipped.
    pub skipped: usize,
    /// Columns with an unconfirmed choice.
    pub chosen: usize,
    /// Columns with only a suggestion.
    pub suggested: usize,
    /// Columns with nothing.
    pub unmapped: usize,
}

/// Per-session mapping state.
#[derive(Debug, Clone, Default)]
pub struct MappingStore {
    sections: BTreeMap<SectionKind, BTreeMap<usize, ColumnMapping>>,
}

impl MappingStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a column from the engine suggestion; `confirmed` starts false.
    ///
    /// A suggested field outside the section vocabulary is dropped.
    pub fn set_suggested(
        &mut self,
        section: SectionKind,
        column_index: usize,
        source_header: impl Into<String>,
        field: Option<String>,
        confidence: f32,
    ) {
        let field = field.filter(|name| {
            let legal = section.vocabulary().contains(&name.as_str());
            if !legal {
                warn!(
                    %section,
                    column = column_index,
                    field = %name,
                    "dropping out-of-vocabulary suggestion"
                );
            }
            legal
        });
        debug!(%section, column = column_index, ?field, confidence, "seeded column");
        self.sections
            .entry(section)
            .or_default()
            .insert(
                column_index,
                ColumnMapping::new(column_index, source_header.into(), field, confidence),
            );
    }

    /// Set an explicit target field (the skip sentinel included).
    ///
    /// Blank input clears the choice and the column's confirmation. Does not
    /// confirm the column.
    ///
    /// # Errors
    ///
    /// `SectionNotLoaded`/`ColumnNotFound` for an unknown address and
    /// `UnknownField` for a name outside the section vocabulary.
    pub fn set_confirmed_field(
        &mut self,
        section: SectionKind,
        column_index: usize,
        field: &str,
    ) -> Result<()> {
        let choice = FieldChoice::parse(field);
        if let Some(FieldChoice::Field(name)) = &choice
            && !section.accepts(name)
        {
            return Err(MappingError::UnknownField {
                section,
                field: name.clone(),
            });
        }
        let mapping = self.column_mut(section, column_index)?;
        match choice {
            Some(choice) => {
                debug!(%section, column = column_index, field = %choice, "set field");
                mapping.confirmed_field = Some(choice);
            }
            None => {
                debug!(%section, column = column_index, "cleared field");
                mapping.confirmed_field = None;
                mapping.confirmed = false;
            }
        }
        Ok(())
    }

    /// Confirm a column with its explicit choice, falling back to the suggestion.
    ///
    /// Idempotent: confirming a confirmed column returns its current field.
    ///
    /// # Errors
    ///
    /// `SectionNotLoaded`/`ColumnNotFound` for an unknown address and
    /// `NothingToConfirm` when neither a choice nor a suggestion exists.
    pub fn confirm(&mut self, section: SectionKind, column_index: usize) -> Result<FieldChoice> {
        let mapping = self.column_mut(section, column_index)?;
        let Some(field) = mapping.effective_field() else {
            return Err(MappingError::NothingToConfirm {
                section,
                column: column_index,
            });
        };
        if !mapping.confirmed {
            debug!(%section, column = column_index, %field, "confirmed column");
        }
        mapping.confirmed_field = Some(field.clone());
        mapping.confirmed = true;
        Ok(field)
    }

    /// Confirm every column whose suggestion passes the auto-accept threshold.
    ///
    /// Columns below the threshold, or without a suggested field, are left
    /// untouched. An existing explicit choice is kept. Returns the number of
    /// newly confirmed columns.
    ///
    /// # Errors
    ///
    /// `SectionNotLoaded` if the section has no data.
    pub fn confirm_all_above_threshold(
        &mut self,
        section: SectionKind,
        policy: &ConfidencePolicy,
    ) -> Result<usize> {
        let columns = self
            .sections
            .get_mut(&section)
            .ok_or(MappingError::SectionNotLoaded(section))?;
        let mut newly_confirmed = 0;
        for mapping in columns.values_mut() {
            if mapping.confirmed || !policy.is_auto_accept_eligible(mapping.confidence) {
                continue;
            }
            let Some(suggested) = &mapping.suggested_field else {
                continue;
            };
            if mapping.confirmed_field.is_none() {
                mapping.confirmed_field = Some(FieldChoice::Field(suggested.clone()));
            }
            mapping.confirmed = true;
            newly_confirmed += 1;
        }
        debug!(%section, newly_confirmed, threshold = policy.auto_accept, "auto-accepted columns");
        Ok(newly_confirmed)
    }

    /// Confirm every column that has an explicit choice.
    ///
    /// Returns the number of newly confirmed columns.
    ///
    /// # Errors
    ///
    /// `SectionNotLoaded` if the section has no data.
    pub fn confirm_chosen(&mut self, section: SectionKind) -> Result<usize> {
        let columns = self
            .sections
            .get_mut(&section)
            .ok_or(MappingError::SectionNotLoaded(section))?;
        let mut newly_confirmed = 0;
        for mapping in columns.values_mut() {
            if mapping.confirmed_field.is_some() && !mapping.confirmed {
                mapping.confirmed = true;
                newly_confirmed += 1;
            }
        }
        Ok(newly_confirmed)
    }

    /// Seed explicit choices (e.g. from a remembered template) without confirming.
    ///
    /// Only unconfirmed columns without a choice are touched; unknown
    /// columns and out-of-vocabulary fields are ignored. Returns the number
    /// of columns updated.
    ///
    /// # Errors
    ///
    /// `SectionNotLoaded` if the section has no data.
    pub fn apply_fields(
        &mut self,
        section: SectionKind,
        fields: &BTreeMap<usize, String>,
    ) -> Result<usize> {
        let columns = self
            .sections
            .get_mut(&section)
            .ok_or(MappingError::SectionNotLoaded(section))?;
        let mut applied = 0;
        for (index, name) in fields {
            let Some(mapping) = columns.get_mut(index) else {
                continue;
            };
            if mapping.confirmed || mapping.confirmed_field.is_some() || !section.accepts(name) {
                continue;
            }
            mapping.confirmed_field = FieldChoice::parse(name);
            applied += 1;
        }
        Ok(applied)
    }

    /// Remove a section's mappings (used when an extract is reloaded).
    pub(crate) fn clear_section(&mut self, section: SectionKind) {
        self.sections.remove(&section);
    }

    /// Register a section with no columns yet.
    pub(crate) fn ensure_section(&mut self, section: SectionKind) {
        self.sections.entry(section).or_default();
    }

    /// Returns true if the section has been seeded.
    pub fn has_section(&self, section: SectionKind) -> bool {
        self.sections.contains_key(&section)
    }

    /// Seeded sections in taxonomy order.
    pub fn sections(&self) -> impl Iterator<Item = SectionKind> + '_ {
        self.sections.keys().copied()
    }

    /// Mapping of a single column.
    pub fn get(&self, section: SectionKind, column_index: usize) -> Option<&ColumnMapping> {
        self.sections.get(&section)?.get(&column_index)
    }

    /// Mappings of a section in column order.
    pub fn columns(&self, section: SectionKind) -> impl Iterator<Item = &ColumnMapping> {
        self.sections.get(&section).into_iter().flat_map(BTreeMap::values)
    }

    /// Summary counts for a section.
    pub fn summary(&self, section: SectionKind) -> MappingSummary {
        let mut summary = MappingSummary::default();
        for mapping in self.columns(section) {
            summary.total += 1;
            match mapping.status() {
                ColumnStatus::Confirmed => summary.confirmed += 1,
                ColumnStatus::Skipped => summary.skipped += 1,
                ColumnStatus::Chosen => summary.chosen += 1,
                ColumnStatus::Suggested => summary.suggested += 1,
                ColumnStatus::Unmapped => summary.unmapped += 1,
            }
        }
        summary
    }

    fn column_mut(&mut self, section: SectionKind, column_index: usize) -> Result<&mut ColumnMapping> {
        self.sections
            .get_mut(&section)
            .ok_or(MappingError::SectionNotLoaded(section))?
            .get_mut(&column_index)
            .ok_or(MappingError::ColumnNotFound {
                section,
                column: column_index,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> MappingStore {
        let mut store = MappingStore::new();
        store.set_suggested(SectionKind::Earnings, 0, "Code", Some("earning_code".into()), 0.92);
        store.set_suggested(SectionKind::Earnings, 1, "Gross", Some("gross_pay".into()), 0.55);
        store.set_suggested(SectionKind::Earnings, 2, "", None, 0.1);
        store
    }

    #[test]
    fn seeding_starts_unconfirmed() {
        let store = seeded();
        let mapping = store.get(SectionKind::Earnings, 0).unwrap();
        assert!(!mapping.confirmed);
        assert_eq!(mapping.confirmed_field, None);
        assert_eq!(mapping.status(), ColumnStatus::Suggested);
    }

    #[test]
    fn out_of_vocabulary_suggestion_is_dropped() {
        let mut store = MappingStore::new();
        store.set_suggested(SectionKind::Earnings, 0, "Tax", Some("tax_code".into()), 0.9);
        assert_eq!(store.get(SectionKind::Earnings, 0).unwrap().suggested_field, None);
    }

    #[test]
    fn set_confirmed_field_does_not_confirm() {
        let mut store = seeded();
        store.set_confirmed_field(SectionKind::Earnings, 1, "current_amount").unwrap();
        let mapping = store.get(SectionKind::Earnings, 1).unwrap();
        assert!(!mapping.confirmed);
        assert_eq!(mapping.status(), ColumnStatus::Chosen);
    }

    #[test]
    fn set_confirmed_field_rejects_foreign_fields() {
        let mut store = seeded();
        let err = store.set_confirmed_field(SectionKind::Earnings, 1, "tax_code").unwrap_err();
        assert!(matches!(err, MappingError::UnknownField { .. }));
        assert_eq!(store.get(SectionKind::Earnings, 1).unwrap().confirmed_field, None);
    }

    #[test]
    fn confirm_falls_back_to_suggestion() {
        let mut store = seeded();
        let field = store.confirm(SectionKind::Earnings, 0).unwrap();
        assert_eq!(field, FieldChoice::Field("earning_code".into()));
        assert_eq!(store.get(SectionKind::Earnings, 0).unwrap().mapped_field(), Some("earning_code"));
    }

    #[test]
    fn blank_choice_falls_back_to_suggestion_at_confirm() {
        let mut store = seeded();
        store.set_confirmed_field(SectionKind::Earnings, 1, "hours").unwrap();
        store.set_confirmed_field(SectionKind::Earnings, 1, "   ").unwrap();
        let field = store.confirm(SectionKind::Earnings, 1).unwrap();
        assert_eq!(field.field(), Some("gross_pay"));
    }

    #[test]
    fn confirm_is_idempotent() {
        let mut store = seeded();
        let first = store.confirm(SectionKind::Earnings, 0).unwrap();
        let before = store.get(SectionKind::Earnings, 0).cloned();
        let second = store.confirm(SectionKind::Earnings, 0).unwrap();
        assert_eq!(first, second);
        assert_eq!(store.get(SectionKind::Earnings, 0).cloned(), before);
    }

    #[test]
    fn confirm_without_any_field_is_reported() {
        let mut store = seeded();
        let err = store.confirm(SectionKind::Earnings, 2).unwrap_err();
        assert_eq!(
            err,
            MappingError::NothingToConfirm {
                section: SectionKind::Earnings,
                column: 2
            }
        );
        assert!(!store.get(SectionKind::Earnings, 2).unwrap().confirmed);
    }

    #[test]
    fn unknown_addresses_are_not_found() {
        let mut store = seeded();
        let err = store.confirm(SectionKind::Taxes, 0).unwrap_err();
        assert!(err.is_not_found());
        let err = store.set_confirmed_field(SectionKind::Earnings, 9, "hours").unwrap_err();
        assert_eq!(err.column(), Some(9));
        assert!(err.is_not_found());
    }

    #[test]
    fn clearing_a_confirmed_column_unconfirms_it() {
        let mut store = seeded();
        store.confirm(SectionKind::Earnings, 0).unwrap();
        store.set_confirmed_field(SectionKind::Earnings, 0, "").unwrap();
        let mapping = store.get(SectionKind::Earnings, 0).unwrap();
        assert!(!mapping.confirmed);
        assert_eq!(mapping.confirmed_field, None);
    }

    #[test]
    fn auto_accept_respects_threshold_and_existing_choice() {
        let mut store = seeded();
        store.set_suggested(SectionKind::Earnings, 3, "Hrs", Some("hours".into()), 0.8);
        store.set_confirmed_field(SectionKind::Earnings, 3, "skip").unwrap();

        let count = store
            .confirm_all_above_threshold(SectionKind::Earnings, &ConfidencePolicy::default())
            .unwrap();

        assert_eq!(count, 2);
        assert!(store.get(SectionKind::Earnings, 0).unwrap().confirmed);
        assert!(!store.get(SectionKind::Earnings, 1).unwrap().confirmed);
        assert_eq!(store.get(SectionKind::Earnings, 3).unwrap().status(), ColumnStatus::Skipped);
    }

    #[test]
    fn apply_fields_only_fills_blank_columns() {
        let mut store = seeded();
        store.set_confirmed_field(SectionKind::Earnings, 0, "rate").unwrap();
        let fields = BTreeMap::from([
            (0, "hours".to_string()),
            (1, "current_amount".to_string()),
            (2, "tax_code".to_string()),
            (7, "hours".to_string()),
        ]);

        let applied = store.apply_fields(SectionKind::Earnings, &fields).unwrap();

        assert_eq!(applied, 1);
        assert_eq!(
            store.get(SectionKind::Earnings, 0).unwrap().confirmed_field,
            Some(FieldChoice::Field("rate".into()))
        );
        assert_eq!(store.get(SectionKind::Earnings, 1).unwrap().status(), ColumnStatus::Chosen);
        assert_eq!(store.get(SectionKind::Earnings, 2).unwrap().status(), ColumnStatus::Unmapped);
    }

    #[test]
    fn summary_counts_statuses() {
        let mut store = seeded();
        store.confirm(SectionKind::Earnings, 0).unwrap();
        let summary = store.summary(SectionKind::Earnings);
        assert_eq!(
            summary,
            MappingSummary {
                total: 3,
                confirmed: 1,
                skipped: 0,
                chosen: 0,
                suggested: 1,
                unmapped: 1,
            }
        );
    }
}
