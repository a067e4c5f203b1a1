//! Remembered mappings for similarly-shaped registers.
//!
//! When an operator saves with "remember for similar files", each compiled
//! section is stored as a [`SectionTemplate`] keyed by its header
//! fingerprint. A later register with the same, or nearly the same, header
//! row can then be pre-seeded with those choices.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use prs_model::{MappingPayload, SectionKind, SectionMapping};
use rapidfuzz::distance::jaro_winkler;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{PersistenceError, Result};
use crate::hash::{header_fingerprint, normalize_header};
use crate::io::{read_json, write_json_atomic};

/// Default minimum mean header similarity for a fuzzy template match.
pub const DEFAULT_MIN_SIMILARITY: f64 = 0.9;

/// Remembered choices for one section's header layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionTemplate {
    /// Section the choices belong to.
    pub section: SectionKind,
    /// Header row the choices were made for.
    pub headers: Vec<String>,
    /// Hex SHA-256 of the section and its normalized header row.
    pub fingerprint: String,
    /// Column index to target field.
    pub fields: SectionMapping,
    /// RFC 3339 timestamp of the save.
    pub saved_at: String,
}

/// A template found for a header row.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateMatch {
    /// The remembered template.
    pub template: SectionTemplate,
    /// Mean header similarity in `[0, 1]`; `1.0` for exact matches.
    pub similarity: f64,
    /// True if the fingerprints are identical.
    pub exact: bool,
}

/// Directory of remembered section templates.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    base_dir: PathBuf,
    min_similarity: f64,
}

impl TemplateStore {
    /// Create a store rooted at `base_dir` with the default threshold.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            min_similarity: DEFAULT_MIN_SIMILARITY,
        }
    }

    /// Override the fuzzy-match threshold (clamped to `[0, 1]`).
    #[must_use]
    pub fn with_min_similarity(mut self, min_similarity: f64) -> Self {
        self.min_similarity = min_similarity.clamp(0.0, 1.0);
        self
    }

    /// Directory holding the template files.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Minimum mean header similarity for a fuzzy match.
    pub fn min_similarity(&self) -> f64 {
        self.min_similarity
    }

    fn path_for(&self, section: SectionKind, fingerprint: &str) -> PathBuf {
        let short = fingerprint.get(..16).unwrap_or(fingerprint);
        self.base_dir.join(format!("{}_{}.json", section.as_str(), short))
    }

    /// Remember a section's confirmed fields for its header row.
    ///
    /// Overwrites any template with the same fingerprint.
    ///
    /// # Errors
    ///
    /// Serialization or write failures.
    pub fn remember(
        &self,
        section: SectionKind,
        headers: &[String],
        fields: &SectionMapping,
    ) -> Result<PathBuf> {
        let fingerprint = header_fingerprint(section, headers);
        let path = self.path_for(section, &fingerprint);
        let template = SectionTemplate {
            section,
            headers: headers.to_vec(),
            fingerprint,
            fields: fields.clone(),
            saved_at: chrono::Utc::now().to_rfc3339(),
        };
        write_json_atomic(&path, &template)?;
        debug!(%section, columns = fields.len(), "remembered template");
        Ok(path)
    }

    /// Remember every section of a compiled payload.
    ///
    /// Sections without a header row in `headers_by_section` are skipped.
    /// Returns the number of templates written.
    ///
    /// # Errors
    ///
    /// The first write failure.
    pub fn remember_payload(
        &self,
        payload: &MappingPayload,
        headers_by_section: &BTreeMap<SectionKind, Vec<String>>,
    ) -> Result<usize> {
        let mut written = 0;
        for (section, fields) in &payload.section_mappings {
            let Some(headers) = headers_by_section.get(section) else {
                warn!(%section, "no header row for section, template not remembered");
                continue;
            };
            self.remember(*section, headers, fields)?;
            written += 1;
        }
        info!(templates = written, "remembered mappings for similar files");
        Ok(written)
    }

    /// Find a remembered template for a section's header row.
    ///
    /// Exact fingerprint hits win. Otherwise the best template with the same
    /// column count whose mean header similarity reaches the threshold.
    ///
    /// # Errors
    ///
    /// Directory read failures. Unreadable template files are skipped.
    pub fn find_similar(
        &self,
        section: SectionKind,
        headers: &[String],
    ) -> Result<Option<TemplateMatch>> {
        if !self.base_dir.exists() {
            return Ok(None);
        }

        let fingerprint = header_fingerprint(section, headers);
        let exact_path = self.path_for(section, &fingerprint);
        if exact_path.exists() {
            let template: SectionTemplate = read_json(&exact_path)?;
            if template.fingerprint == fingerprint {
                return Ok(Some(TemplateMatch {
                    template,
                    similarity: 1.0,
                    exact: true,
                }));
            }
        }

        let mut best: Option<TemplateMatch> = None;
        for template in self.load_section(section)? {
            if template.headers.len() != headers.len() {
                continue;
            }
            let similarity = mean_similarity(&template.headers, headers);
            if similarity < self.min_similarity {
                continue;
            }
            if best.as_ref().is_none_or(|b| similarity > b.similarity) {
                best = Some(TemplateMatch {
                    template,
                    similarity,
                    exact: false,
                });
            }
        }
        if let Some(found) = &best {
            debug!(%section, similarity = found.similarity, "similar template found");
        }
        Ok(best)
    }

    fn load_section(&self, section: SectionKind) -> Result<Vec<SectionTemplate>> {
        let entries = fs::read_dir(&self.base_dir).map_err(|e| PersistenceError::Io {
            operation: "read directory",
            path: self.base_dir.clone(),
            source: e,
        })?;
        let prefix = format!("{}_", section.as_str());

        let mut templates = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let matches_section = path
                .file_name()
                .and_then(std::ffi::OsStr::to_str)
                .is_some_and(|n| n.starts_with(&prefix) && n.ends_with(".json"));
            if !matches_section {
                continue;
            }
            match read_json::<SectionTemplate>(&path) {
                Ok(template) if template.section == section => templates.push(template),
                Ok(_) => {}
                Err(error) => warn!(%error, "skipping unreadable template"),
            }
        }
        Ok(templates)
    }
}

fn mean_similarity(left: &[String], right: &[String]) -> f64 {
    if left.is_empty() {
        return 1.0;
    }
    let total: f64 = left
        .iter()
        .zip(right)
        .map(|(a, b)| {
            let a = normalize_header(a);
            let b = normalize_header(b);
            if a == b {
                1.0
            } else {
                jaro_winkler::similarity(a.chars(), b.chars())
            }
        })
        .sum();
    total / left.len() as f64
}
