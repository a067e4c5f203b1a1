//! Section confirmation state machine.
//!
//! Every section kind starts in [`SectionStatus::NoData`], moves to
//! [`SectionStatus::Pending`] when its extract loads and to
//! [`SectionStatus::Confirmed`] on an explicit confirmation. Nothing moves a
//! section backwards. The workflow also owns the active-section pointer.

use std::collections::BTreeMap;

use prs_model::SectionKind;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{MappingError, Result};
use crate::store::MappingStore;

/// Lifecycle status of a section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionStatus {
    /// No extract available.
    #[default]
    NoData,
    /// Extract loaded, awaiting confirmation.
    Pending,
    /// Confirmed by the operator or engine.
    Confirmed,
}

impl SectionStatus {
    /// Returns true if an extract has been loaded.
    pub fn has_data(&self) -> bool {
        !matches!(self, Self::NoData)
    }

    /// Display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoData => "no data",
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
        }
    }
}

/// Result of a section confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionTransition {
    /// Section that was confirmed.
    pub section: SectionKind,
    /// Status before the call.
    pub previous: SectionStatus,
    /// Columns confirmed as part of the section confirmation.
    pub columns_confirmed: usize,
    /// Section the active pointer moved to, if it moved.
    pub advanced_to: Option<SectionKind>,
}

impl SectionTransition {
    /// Returns true if the call changed the section's status.
    pub fn changed(&self) -> bool {
        self.previous != SectionStatus::Confirmed
    }
}

/// Per-section lifecycle and active-section pointer.
#[derive(Debug, Clone)]
pub struct SectionWorkflow {
    statuses: BTreeMap<SectionKind, SectionStatus>,
    active: Option<SectionKind>,
}

impl Default for SectionWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

impl SectionWorkflow {
    /// Create a workflow with every section in `NoData` and no active section.
    pub fn new() -> Self {
        Self {
            statuses: SectionKind::ALL
                .iter()
                .map(|kind| (*kind, SectionStatus::NoData))
                .collect(),
            active: None,
        }
    }

    /// Status of a section.
    pub fn status(&self, kind: SectionKind) -> SectionStatus {
        self.statuses.get(&kind).copied().unwrap_or_default()
    }

    /// All sections with their status, in taxonomy order.
    pub fn statuses(&self) -> impl Iterator<Item = (SectionKind, SectionStatus)> + '_ {
        self.statuses.iter().map(|(kind, status)| (*kind, *status))
    }

    /// Currently active section.
    pub fn active(&self) -> Option<SectionKind> {
        self.active
    }

    /// Point the active section at `kind` (operator navigation).
    pub fn set_active(&mut self, kind: SectionKind) {
        debug!(section = %kind, "active section changed");
        self.active = Some(kind);
    }

    /// Record that an extract for `kind` is available.
    ///
    /// `NoData` becomes `Pending`; other statuses are unchanged. Returns true
    /// if the status changed.
    pub fn mark_loaded(&mut self, kind: SectionKind) -> bool {
        let status = self.statuses.entry(kind).or_default();
        if *status == SectionStatus::NoData {
            *status = SectionStatus::Pending;
            debug!(section = %kind, "section pending");
            true
        } else {
            false
        }
    }

    /// Select the first pending section if nothing pending is active.
    ///
    /// Returns the active section afterwards.
    pub fn activate_first_pending(&mut self) -> Option<SectionKind> {
        let active_is_pending = self
            .active
            .is_some_and(|kind| self.status(kind) == SectionStatus::Pending);
        if !active_is_pending && let Some(first) = self.first_with(SectionStatus::Pending) {
            self.set_active(first);
        }
        self.active
    }

    /// Confirm a section and every column in it with an explicit choice.
    ///
    /// Confirming an already-confirmed section changes nothing. When the
    /// confirmed section was active, the pointer moves to the next pending
    /// section in taxonomy order, wrapping to earlier sections; with no
    /// pending section left it stays put.
    ///
    /// # Errors
    ///
    /// `NoData` for a section without an extract.
    pub fn confirm_section(
        &mut self,
        kind: SectionKind,
        store: &mut MappingStore,
    ) -> Result<SectionTransition> {
        let previous = self.status(kind);
        match previous {
            SectionStatus::NoData => Err(MappingError::NoData(kind)),
            SectionStatus::Confirmed => Ok(SectionTransition {
                section: kind,
                previous,
                columns_confirmed: 0,
                advanced_to: None,
            }),
            SectionStatus::Pending => {
                // a store seeded outside a session may lack the section
                let columns_confirmed = if store.has_section(kind) {
                    store.confirm_chosen(kind)?
                } else {
                    0
                };
                self.statuses.insert(kind, SectionStatus::Confirmed);
                let advanced_to = if self.active == Some(kind) {
                    let next = self.next_pending_after(kind);
                    if let Some(next) = next {
                        self.active = Some(next);
                    }
                    next
                } else {
                    None
                };
                info!(
                    section = %kind,
                    columns_confirmed,
                    advanced_to = advanced_to.map(|k| k.as_str()),
                    "section confirmed"
                );
                Ok(SectionTransition {
                    section: kind,
                    previous,
                    columns_confirmed,
                    advanced_to,
                })
            }
        }
    }

    /// Returns true if every section with data is confirmed.
    pub fn is_complete(&self) -> bool {
        self.statuses
            .values()
            .all(|status| *status != SectionStatus::Pending)
    }

    /// Sections with data, in taxonomy order.
    pub fn sections_with_data(&self) -> impl Iterator<Item = SectionKind> + '_ {
        self.statuses()
            .filter(|(_, status)| status.has_data())
            .map(|(kind, _)| kind)
    }

    /// Sections still awaiting confirmation, in taxonomy order.
    pub fn pending(&self) -> impl Iterator<Item = SectionKind> + '_ {
        self.statuses()
            .filter(|(_, status)| *status == SectionStatus::Pending)
            .map(|(kind, _)| kind)
    }

    fn first_with(&self, wanted: SectionStatus) -> Option<SectionKind> {
        self.statuses()
            .find(|(_, status)| *status == wanted)
            .map(|(kind, _)| kind)
    }

    fn next_pending_after(&self, kind: SectionKind) -> Option<SectionKind> {
        let after = SectionKind::ALL.iter().skip(kind.ordinal() + 1);
        let before = SectionKind::ALL.iter().take(kind.ordinal());
        after
            .chain(before)
            .copied()
            .find(|candidate| self.status(*candidate) == SectionStatus::Pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(kinds: &[SectionKind]) -> (SectionWorkflow, MappingStore) {
        let mut workflow = SectionWorkflow::new();
        let mut store = MappingStore::new();
        for kind in kinds {
            store.set_suggested(*kind, 0, "Col", None, 0.0);
            workflow.mark_loaded(*kind);
        }
        workflow.activate_first_pending();
        (workflow, store)
    }

    #[test]
    fn starts_without_data() {
        let workflow = SectionWorkflow::new();
        assert!(SectionKind::ALL
            .iter()
            .all(|kind| workflow.status(*kind) == SectionStatus::NoData));
        assert_eq!(workflow.active(), None);
        assert!(workflow.is_complete());
    }

    #[test]
    fn activates_first_section_with_data() {
        let (workflow, _) = loaded(&[SectionKind::Taxes, SectionKind::Earnings]);
        assert_eq!(workflow.active(), Some(SectionKind::Earnings));
        assert!(!workflow.is_complete());
    }

    #[test]
    fn confirm_advances_and_wraps() {
        let (mut workflow, mut store) = loaded(&[SectionKind::Earnings, SectionKind::Deductions]);
        workflow.set_active(SectionKind::Deductions);

        let transition = workflow.confirm_section(SectionKind::Deductions, &mut store).unwrap();

        assert_eq!(transition.advanced_to, Some(SectionKind::Earnings));
        assert_eq!(workflow.active(), Some(SectionKind::Earnings));
    }

    #[test]
    fn last_confirmation_leaves_pointer_unchanged() {
        let (mut workflow, mut store) = loaded(&[SectionKind::Taxes]);

        let transition = workflow.confirm_section(SectionKind::Taxes, &mut store).unwrap();

        assert_eq!(transition.advanced_to, None);
        assert_eq!(workflow.active(), Some(SectionKind::Taxes));
        assert!(workflow.is_complete());
    }

    #[test]
    fn confirming_inactive_section_keeps_pointer() {
        let (mut workflow, mut store) = loaded(&[SectionKind::Earnings, SectionKind::Taxes]);

        workflow.confirm_section(SectionKind::Taxes, &mut store).unwrap();

        assert_eq!(workflow.active(), Some(SectionKind::Earnings));
    }

    #[test]
    fn confirm_is_idempotent_and_never_reverts() {
        let (mut workflow, mut store) = loaded(&[SectionKind::Earnings]);
        workflow.confirm_section(SectionKind::Earnings, &mut store).unwrap();

        let again = workflow.confirm_section(SectionKind::Earnings, &mut store).unwrap();
        assert!(!again.changed());

        assert!(!workflow.mark_loaded(SectionKind::Earnings));
        assert_eq!(workflow.status(SectionKind::Earnings), SectionStatus::Confirmed);
    }

    #[test]
    fn no_data_sections_cannot_be_confirmed() {
        let (mut workflow, mut store) = loaded(&[SectionKind::Earnings]);
        let err = workflow
            .confirm_section(SectionKind::EmployeeInfo, &mut store)
            .unwrap_err();
        assert_eq!(err, MappingError::NoData(SectionKind::EmployeeInfo));
    }
}
