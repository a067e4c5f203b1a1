//! Mapping run shared by the `review` and `map` commands.
//!
//! The run is a fixed sequence over one [`MappingSession`]:
//!
//! 1. fetch extracts and load them
//! 2. seed choices from remembered templates (never confirmed)
//! 3. auto-accept high-confidence suggestions, if requested
//! 4. apply explicit `--set` overrides
//! 5. confirm the requested sections
//! 6. compile and save; remember templates after a successful save

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info, info_span, trace, warn};

use prs_map::{LoadReport, MappingSession, SectionTransition};
use prs_model::{HeaderMetadata, MappingPayload, SaveOutcome, SectionKind};
use prs_persistence::{ExtractProvider, MappingSink, TemplateStore, save_with_outcome};

use crate::logging::redact_value;
use crate::settings::Settings;

/// An explicit column choice, written `SECTION:COLUMN=FIELD`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnOverride {
    pub section: SectionKind,
    pub column: usize,
    /// Target field, `skip`, or empty to clear a choice.
    pub field: String,
}

impl FromStr for ColumnOverride {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (target, field) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected SECTION:COLUMN=FIELD, got '{s}'"))?;
        let (section, column) = target
            .split_once(':')
            .ok_or_else(|| anyhow!("expected SECTION:COLUMN before '=', got '{target}'"))?;
        let section: SectionKind = section.parse().map_err(|error| anyhow!("{error}"))?;
        let column = column
            .trim()
            .parse()
            .with_context(|| format!("invalid column index '{}'", column.trim()))?;
        Ok(Self {
            section,
            column,
            field: field.trim().to_string(),
        })
    }
}

impl fmt::Display for ColumnOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}={}", self.section, self.column, self.field)
    }
}

/// What the operator asked a `map` run to do.
#[derive(Debug, Clone, Default)]
pub struct MapOptions {
    pub auto_accept: bool,
    pub overrides: Vec<ColumnOverride>,
    pub confirm: Vec<SectionKind>,
    pub confirm_all_sections: bool,
    pub header: HeaderMetadata,
    pub remember: bool,
    pub use_templates: bool,
    pub dry_run: bool,
}

/// A template applied to a section during the run.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedTemplate {
    pub section: SectionKind,
    pub similarity: f64,
    pub exact: bool,
    pub columns: usize,
}

/// Everything a `map` run produced.
#[derive(Debug)]
pub struct MapOutcome {
    pub source_id: String,
    pub session: MappingSession,
    pub load: LoadReport,
    pub templates: Vec<AppliedTemplate>,
    pub auto_accepted: usize,
    pub transitions: Vec<SectionTransition>,
    pub payload: MappingPayload,
    /// `None` for dry runs.
    pub save: Option<SaveOutcome>,
    pub remembered: usize,
}

impl MapOutcome {
    /// True unless a save was attempted and failed.
    pub fn succeeded(&self) -> bool {
        self.save.as_ref().is_none_or(|outcome| outcome.success)
    }
}

/// Fetch extracts and load them into a session configured from `settings`.
///
/// # Errors
///
/// Fails when the provider cannot supply the document's extracts.
pub fn load_session<P>(
    provider: &P,
    source_id: &str,
    settings: &Settings,
) -> Result<(MappingSession, LoadReport)>
where
    P: ExtractProvider + ?Sized,
{
    let extracts = provider
        .get_extracts(source_id)
        .with_context(|| format!("fetch extracts for '{source_id}'"))?;
    for extract in &extracts {
        for (row, values) in extract.sample_rows.iter().enumerate() {
            let shown: Vec<&str> = values.iter().map(|v| redact_value(v)).collect();
            trace!(section = %extract.section_id, row, values = ?shown, "sample row");
        }
    }

    let mut session = MappingSession::new()
        .with_policy(settings.confidence)
        .with_detector(settings.detector);
    let report = session.load_extracts(extracts);
    for error in &report.rejected {
        warn!(%error, "extract rejected, section keeps no data");
    }
    Ok((session, report))
}

/// Run the full mapping workflow for one source document.
///
/// # Errors
///
/// Fetch failures and operator input the session rejects (unknown fields,
/// columns or sections without data). A failed save is not an error; it is
/// reported through [`MapOutcome::save`].
pub fn run_map<P, S>(
    provider: &P,
    sink: &S,
    templates: Option<&TemplateStore>,
    settings: &Settings,
    source_id: &str,
    options: &MapOptions,
) -> Result<MapOutcome>
where
    P: ExtractProvider + ?Sized,
    S: MappingSink + ?Sized,
{
    let span = info_span!("map", source_id);
    let _guard = span.enter();

    let (mut session, load) = load_session(provider, source_id, settings)?;

    let applied = match templates {
        Some(store) if options.use_templates => seed_from_templates(&mut session, store),
        _ => Vec::new(),
    };

    let mut auto_accepted = 0;
    if options.auto_accept {
        let pending: Vec<SectionKind> = session.workflow().pending().collect();
        for section in pending {
            auto_accepted += session
                .confirm_all_above_threshold(section)
                .with_context(|| format!("auto-accept {section}"))?;
        }
        info!(columns = auto_accepted, "auto-accepted high-confidence suggestions");
    }

    for choice in &options.overrides {
        session
            .set_confirmed_field(choice.section, choice.column, &choice.field)
            .with_context(|| format!("apply --set {choice}"))?;
    }

    let mut transitions = Vec::new();
    let mut to_confirm = options.confirm.clone();
    if options.confirm_all_sections {
        to_confirm.extend(session.workflow().pending());
    }
    for section in to_confirm {
        let transition = session
            .confirm_section(section)
            .with_context(|| format!("confirm section {section}"))?;
        transitions.push(transition);
    }

    *session.header_mut() = options.header.clone();
    let payload = session.compile(options.remember);

    let (save, remembered) = if options.dry_run {
        info!("dry run, mappings not saved");
        (None, 0)
    } else {
        let outcome = save_with_outcome(sink, source_id, &payload);
        let remembered = match templates {
            Some(store) if outcome.success && payload.remember_for_similar_files => {
                remember_templates(&session, &payload, store)
            }
            _ => 0,
        };
        (Some(outcome), remembered)
    };

    Ok(MapOutcome {
        source_id: source_id.to_string(),
        session,
        load,
        templates: applied,
        auto_accepted,
        transitions,
        payload,
        save,
        remembered,
    })
}

fn seed_from_templates(
    session: &mut MappingSession,
    store: &TemplateStore,
) -> Vec<AppliedTemplate> {
    let pending: Vec<SectionKind> = session.workflow().pending().collect();
    let mut applied = Vec::new();
    for section in pending {
        let Some(headers) = session.extract(section).map(|e| e.headers.clone()) else {
            continue;
        };
        let found = match store.find_similar(section, &headers) {
            Ok(Some(found)) => found,
            Ok(None) => continue,
            Err(error) => {
                warn!(%section, %error, "template lookup failed");
                continue;
            }
        };
        match session.apply_template(section, &found.template.fields) {
            Ok(columns) => {
                debug!(%section, columns, similarity = found.similarity, "template applied");
                applied.push(AppliedTemplate {
                    section,
                    similarity: found.similarity,
                    exact: found.exact,
                    columns,
                });
            }
            Err(error) => warn!(%section, %error, "template not applied"),
        }
    }
    applied
}

fn remember_templates(
    session: &MappingSession,
    payload: &MappingPayload,
    store: &TemplateStore,
) -> usize {
    let headers: BTreeMap<SectionKind, Vec<String>> = payload
        .section_mappings
        .keys()
        .filter_map(|section| {
            session
                .extract(*section)
                .map(|extract| (*section, extract.headers.clone()))
        })
        .collect();
    match store.remember_payload(payload, &headers) {
        Ok(count) => count,
        Err(error) => {
            // the mapping itself is saved; only the template is lost
            warn!(%error, "failed to remember templates");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_column_override() {
        let parsed: ColumnOverride = "earnings:2=gross_pay".parse().unwrap();
        assert_eq!(parsed.section, SectionKind::Earnings);
        assert_eq!(parsed.column, 2);
        assert_eq!(parsed.field, "gross_pay");
        assert_eq!(parsed.to_string(), "earnings:2=gross_pay");
    }

    #[test]
    fn override_allows_empty_field() {
        let parsed: ColumnOverride = "taxes:0=".parse().unwrap();
        assert_eq!(parsed.field, "");
    }

    #[test]
    fn malformed_overrides_are_rejected() {
        assert!("earnings=gross_pay".parse::<ColumnOverride>().is_err());
        assert!("earnings:x=gross_pay".parse::<ColumnOverride>().is_err());
        assert!("payroll:1=gross_pay".parse::<ColumnOverride>().is_err());
        assert!("earnings:1".parse::<ColumnOverride>().is_err());
    }
}
