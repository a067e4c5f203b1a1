//! Fixed section taxonomy of a payroll register.
//!
//! Every source document is split into the same ordered set of sections.
//! Each section owns a disjoint vocabulary of canonical target fields; the
//! skip sentinel is legal everywhere.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reserved target-field value meaning "intentionally not mapped".
pub const SKIP_FIELD: &str = "skip";

const EMPLOYEE_INFO_FIELDS: &[&str] = &[
    "employee_id",
    "employee_name",
    "ssn_last4",
    "department",
    "job_title",
    "pay_rate",
    "pay_type",
];

const EARNINGS_FIELDS: &[&str] = &[
    "earning_code",
    "earning_description",
    "hours",
    "rate",
    "current_amount",
    "ytd_amount",
    "gross_pay",
];

const TAXES_FIELDS: &[&str] = &[
    "tax_code",
    "tax_description",
    "taxable_wages",
    "employee_tax",
    "employer_tax",
    "ytd_tax",
];

const DEDUCTIONS_FIELDS: &[&str] = &[
    "deduction_code",
    "deduction_description",
    "pre_tax_amount",
    "post_tax_amount",
    "ytd_deduction",
    "net_pay",
];

const EMPLOYER_CONTRIBUTIONS_FIELDS: &[&str] = &[
    "contribution_code",
    "contribution_description",
    "contribution_amount",
    "ytd_contribution",
];

/// Logical section of a payroll register.
///
/// Declaration order is the taxonomy order used for navigation and for the
/// compiled payload.
///
/// # Example
///
/// ```
/// use prs_model::SectionKind;
///
/// let kind: SectionKind = "Earnings".parse().unwrap();
/// assert_eq!(kind, SectionKind::Earnings);
/// assert!(kind.accepts("gross_pay"));
/// assert!(!kind.accepts("tax_code"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    /// Employee identity and pay setup.
    EmployeeInfo,
    /// Earnings lines (regular, overtime, bonuses).
    Earnings,
    /// Employee and employer tax withholdings.
    Taxes,
    /// Pre- and post-tax deductions.
    Deductions,
    /// Employer-paid contributions (benefits, retirement match).
    EmployerContributions,
}

impl SectionKind {
    /// All section kinds in taxonomy order.
    pub const ALL: [SectionKind; 5] = [
        Self::EmployeeInfo,
        Self::Earnings,
        Self::Taxes,
        Self::Deductions,
        Self::EmployerContributions,
    ];

    /// Returns the wire identifier (`snake_case`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmployeeInfo => "employee_info",
            Self::Earnings => "earnings",
            Self::Taxes => "taxes",
            Self::Deductions => "deductions",
            Self::EmployerContributions => "employer_contributions",
        }
    }

    /// Human-readable section title.
    pub fn label(&self) -> &'static str {
        match self {
            Self::EmployeeInfo => "Employee Info",
            Self::Earnings => "Earnings",
            Self::Taxes => "Taxes",
            Self::Deductions => "Deductions",
            Self::EmployerContributions => "Employer Contributions",
        }
    }

    /// Canonical target fields legal for this section, excluding the skip sentinel.
    pub fn vocabulary(&self) -> &'static [&'static str] {
        match self {
            Self::EmployeeInfo => EMPLOYEE_INFO_FIELDS,
            Self::Earnings => EARNINGS_FIELDS,
            Self::Taxes => TAXES_FIELDS,
            Self::Deductions => DEDUCTIONS_FIELDS,
            Self::EmployerContributions => EMPLOYER_CONTRIBUTIONS_FIELDS,
        }
    }

    /// Returns true if `field` is in this section's vocabulary or is the skip sentinel.
    pub fn accepts(&self, field: &str) -> bool {
        field == SKIP_FIELD || self.vocabulary().contains(&field)
    }

    /// Position of this section in taxonomy order.
    pub fn ordinal(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SectionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "employee_info" | "employee" => Ok(Self::EmployeeInfo),
            "earnings" => Ok(Self::Earnings),
            "taxes" => Ok(Self::Taxes),
            "deductions" => Ok(Self::Deductions),
            "employer_contributions" | "contributions" => Ok(Self::EmployerContributions),
            _ => Err(format!("Unknown section: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn vocabularies_are_disjoint() {
        let mut seen = BTreeSet::new();
        for kind in SectionKind::ALL {
            for field in kind.vocabulary() {
                assert!(seen.insert(*field), "{field} appears in more than one section");
            }
        }
    }

    #[test]
    fn skip_is_legal_everywhere() {
        for kind in SectionKind::ALL {
            assert!(kind.accepts(SKIP_FIELD));
            assert!(!kind.vocabulary().contains(&SKIP_FIELD));
        }
    }

    #[test]
    fn taxonomy_order_matches_ordinal() {
        for (idx, kind) in SectionKind::ALL.iter().enumerate() {
            assert_eq!(kind.ordinal(), idx);
        }
    }

    #[test]
    fn parse_accepts_labels_and_wire_ids() {
        assert_eq!(
            "Employer Contributions".parse::<SectionKind>(),
            Ok(SectionKind::EmployerContributions)
        );
        assert_eq!("employee-info".parse::<SectionKind>(), Ok(SectionKind::EmployeeInfo));
        assert!("totals".parse::<SectionKind>().is_err());
    }
}
