//! Tunable thresholds loaded from a TOML file.
//!
//! ```toml
//! [confidence]
//! high = 0.7
//! medium = 0.4
//! auto_accept = 0.7
//!
//! [detector]
//! max_samples = 5
//! min_numeric_tokens = 3
//! max_atomic_len = 40
//!
//! [templates]
//! enabled = true
//! dir = "templates"
//! min_similarity = 0.9
//! ```
//!
//! Every key is optional; missing keys keep their defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use prs_map::{ConfidencePolicy, MergedColumnDetector};
use prs_persistence::{DEFAULT_MIN_SIMILARITY, TemplateStore};
use serde::{Deserialize, Serialize};

/// Settings for a CLI run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Confidence tiers and the auto-accept threshold.
    pub confidence: ConfidencePolicy,
    /// Merged-column heuristic tunables.
    pub detector: MergedColumnDetector,
    /// Remembered-template lookup.
    pub templates: TemplateSettings,
}

/// Remembered-template settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateSettings {
    /// Look up and remember templates at all.
    pub enabled: bool,
    /// Template directory; defaults to `<output-dir>/templates`.
    pub dir: Option<PathBuf>,
    /// Minimum mean header similarity for a fuzzy match.
    pub min_similarity: f64,
}

impl Default for TemplateSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
            min_similarity: DEFAULT_MIN_SIMILARITY,
        }
    }
}

impl TemplateSettings {
    /// Template store rooted at the configured directory or under `output_dir`.
    pub fn store(&self, output_dir: &Path) -> TemplateStore {
        let dir = self
            .dir
            .clone()
            .unwrap_or_else(|| output_dir.join("templates"));
        TemplateStore::new(dir).with_min_similarity(self.min_similarity)
    }
}

impl Settings {
    /// Load settings from `path`, or defaults when no path is given.
    ///
    /// # Errors
    ///
    /// Read, parse or validation failures.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => Ok(Self::default()),
        }
    }

    /// Load and validate settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Read, parse or validation failures.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("read settings {}", path.display()))?;
        let settings: Self = toml::from_str(&content)
            .with_context(|| format!("parse settings {}", path.display()))?;
        settings
            .validate()
            .with_context(|| format!("invalid settings {}", path.display()))?;
        Ok(settings)
    }

    /// Serialize to pretty TOML.
    ///
    /// # Errors
    ///
    /// Serialization failures.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).context("serialize settings")
    }

    /// Check threshold ranges and ordering.
    ///
    /// # Errors
    ///
    /// The first out-of-range or inconsistent value.
    pub fn validate(&self) -> Result<()> {
        let c = &self.confidence;
        for (name, value) in [
            ("confidence.high", c.high),
            ("confidence.medium", c.medium),
            ("confidence.auto_accept", c.auto_accept),
        ] {
            ensure!((0.0..=1.0).contains(&value), "{name} must be within [0, 1], got {value}");
        }
        ensure!(
            c.medium <= c.high,
            "confidence.medium ({}) must not exceed confidence.high ({})",
            c.medium,
            c.high
        );
        ensure!(self.detector.max_samples > 0, "detector.max_samples must be positive");
        ensure!(
            self.detector.min_numeric_tokens > 0,
            "detector.min_numeric_tokens must be positive"
        );
        ensure!(
            (0.0..=1.0).contains(&self.templates.min_similarity),
            "templates.min_similarity must be within [0, 1], got {}",
            self.templates.min_similarity
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_keys_keep_defaults() {
        let settings: Settings = toml::from_str("[confidence]\nauto_accept = 0.85\n").unwrap();

        assert!((settings.confidence.auto_accept - 0.85).abs() < f32::EPSILON);
        assert!((settings.confidence.high - 0.7).abs() < f32::EPSILON);
        assert_eq!(settings.detector, MergedColumnDetector::default());
        assert!(settings.templates.enabled);
    }

    #[test]
    fn load_without_path_is_default() {
        assert_eq!(Settings::load(None).unwrap(), Settings::default());
    }

    #[test]
    fn loads_file_and_rejects_inverted_tiers() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("good.toml");
        fs::write(&good, "[templates]\nenabled = false\nmin_similarity = 0.8\n").unwrap();
        let settings = Settings::load_from(&good).unwrap();
        assert!(!settings.templates.enabled);

        let bad = dir.path().join("bad.toml");
        fs::write(&bad, "[confidence]\nhigh = 0.3\nmedium = 0.5\n").unwrap();
        let err = Settings::load_from(&bad).unwrap_err();
        assert!(format!("{err:#}").contains("must not exceed"));
    }

    #[test]
    fn default_settings_survive_toml() {
        let text = Settings::default().to_toml_string().unwrap();
        let back: Settings = toml::from_str(&text).unwrap();
        assert_eq!(back, Settings::default());
    }

    #[test]
    fn template_dir_defaults_under_output() {
        let store = TemplateSettings::default().store(Path::new("out"));
        assert_eq!(store.base_dir(), Path::new("out").join("templates"));
    }
}
