//! Raw per-section extracts supplied by the extraction engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::section::SectionKind;

/// Machine-suggested classification of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Suggested target field, if the engine produced one.
    #[serde(default)]
    pub field: Option<String>,
    /// Confidence score in `[0, 1]`.
    pub confidence: f32,
}

impl Classification {
    /// Create a classification with a suggested field.
    pub fn new(field: impl Into<String>, confidence: f32) -> Self {
        Self {
            field: Some(field.into()),
            confidence,
        }
    }

    /// Create a classification with no suggested field.
    pub fn unknown(confidence: f32) -> Self {
        Self {
            field: None,
            confidence,
        }
    }
}

/// One section's worth of raw tabular data.
///
/// Column index is the only stable identity of a column: headers may repeat
/// or be blank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extract {
    /// Section this extract belongs to.
    pub section_id: SectionKind,
    /// One header per physical column, order-significant.
    pub headers: Vec<String>,
    /// Sample rows aligned by index to `headers`.
    #[serde(default)]
    pub sample_rows: Vec<Vec<String>>,
    /// Row count of the full (non-sample) data.
    #[serde(default)]
    pub row_count: u64,
    /// Suggestions keyed by column index.
    #[serde(default)]
    pub suggested_classifications: BTreeMap<usize, Classification>,
}

impl Extract {
    /// Create an extract with headers only.
    pub fn new(section_id: SectionKind, headers: Vec<String>) -> Self {
        Self {
            section_id,
            headers,
            sample_rows: Vec::new(),
            row_count: 0,
            suggested_classifications: BTreeMap::new(),
        }
    }

    /// Add a sample row.
    #[must_use]
    pub fn with_row(mut self, row: Vec<String>) -> Self {
        self.sample_rows.push(row);
        self.row_count = self.row_count.max(self.sample_rows.len() as u64);
        self
    }

    /// Add a suggested classification for a column.
    #[must_use]
    pub fn with_suggestion(mut self, column: usize, classification: Classification) -> Self {
        self.suggested_classifications.insert(column, classification);
        self
    }

    /// Number of physical columns.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Sample values of one column in row order.
    ///
    /// Returns an empty vector for an out-of-range index.
    pub fn column_samples(&self, column: usize) -> Vec<&str> {
        self.sample_rows
            .iter()
            .filter_map(|row| row.get(column).map(String::as_str))
            .collect()
    }

    /// Suggested classification for a column, if any.
    pub fn suggestion(&self, column: usize) -> Option<&Classification> {
        self.suggested_classifications.get(&column)
    }

    /// Check the structural invariants of the extract.
    ///
    /// # Errors
    ///
    /// Returns the first violation found: a ragged sample row, a
    /// classification past the last column, or a confidence outside `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        let expected = self.headers.len();
        for (row, cells) in self.sample_rows.iter().enumerate() {
            if cells.len() != expected {
                return Err(ModelError::RaggedRow {
                    section: self.section_id,
                    row,
                    expected,
                    found: cells.len(),
                });
            }
        }
        for (&column, classification) in &self.suggested_classifications {
            if column >= expected {
                return Err(ModelError::ClassificationOutOfRange {
                    section: self.section_id,
                    column,
                    columns: expected,
                });
            }
            if !(0.0..=1.0).contains(&classification.confidence) {
                return Err(ModelError::ConfidenceOutOfRange {
                    section: self.section_id,
                    column,
                    confidence: classification.confidence,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn column_samples_follow_row_order() {
        let extract = Extract::new(SectionKind::Earnings, strings(&["Code", "Amount"]))
            .with_row(strings(&["REG", "100.00"]))
            .with_row(strings(&["OT", "25.50"]));

        assert_eq!(extract.column_samples(1), vec!["100.00", "25.50"]);
        assert!(extract.column_samples(5).is_empty());
        assert_eq!(extract.row_count, 2);
    }

    #[test]
    fn validate_rejects_ragged_rows() {
        let extract = Extract::new(SectionKind::Taxes, strings(&["Tax", "Amount"]))
            .with_row(strings(&["FIT"]));

        assert_eq!(
            extract.validate(),
            Err(ModelError::RaggedRow {
                section: SectionKind::Taxes,
                row: 0,
                expected: 2,
                found: 1,
            })
        );
    }

    #[test]
    fn validate_rejects_bad_classifications() {
        let base = Extract::new(SectionKind::Taxes, strings(&["Tax"]));

        let out_of_range = base.clone().with_suggestion(3, Classification::new("tax_code", 0.9));
        assert!(matches!(
            out_of_range.validate(),
            Err(ModelError::ClassificationOutOfRange { column: 3, .. })
        ));

        let bad_score = base.with_suggestion(0, Classification::new("tax_code", 1.5));
        assert!(matches!(
            bad_score.validate(),
            Err(ModelError::ConfidenceOutOfRange { column: 0, .. })
        ));
    }

    #[test]
    fn deserializes_wire_shape() {
        let json = r#"{
            "sectionId": "earnings",
            "headers": ["Code", "Amount"],
            "sampleRows": [["REG", "100.00"]],
            "rowCount": 12,
            "suggestedClassifications": {
                "0": {"field": "earning_code", "confidence": 0.92},
                "1": {"field": null, "confidence": 0.1}
            }
        }"#;
        let extract: Extract = serde_json::from_str(json).unwrap();

        assert_eq!(extract.section_id, SectionKind::Earnings);
        assert_eq!(extract.row_count, 12);
        assert_eq!(
            extract.suggestion(0),
            Some(&Classification::new("earning_code", 0.92))
        );
        assert_eq!(extract.suggestion(1).and_then(|c| c.field.as_deref()), None);
        assert!(extract.validate().is_ok());
    }
}
