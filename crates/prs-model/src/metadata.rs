//! Session-level header metadata.

use serde::{Deserialize, Serialize};

/// Free-form header fields of the register.
///
/// Edited independently of column mappings and passed through verbatim to
/// the compiled payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderMetadata {
    /// Company name as printed on the register.
    pub company: Option<String>,
    /// First day of the pay period.
    pub pay_period_start: Option<String>,
    /// Last day of the pay period.
    pub pay_period_end: Option<String>,
    /// Check (pay) date.
    pub check_date: Option<String>,
}

impl HeaderMetadata {
    /// Returns true if no field has been filled in.
    pub fn is_empty(&self) -> bool {
        self.company.is_none()
            && self.pay_period_start.is_none()
            && self.pay_period_end.is_none()
            && self.check_date.is_none()
    }

    /// Set the company name.
    #[must_use]
    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    /// Set the pay period bounds.
    #[must_use]
    pub fn with_pay_period(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.pay_period_start = Some(start.into());
        self.pay_period_end = Some(end.into());
        self
    }

    /// Set the check date.
    #[must_use]
    pub fn with_check_date(mut self, check_date: impl Into<String>) -> Self {
        self.check_date = Some(check_date.into());
        self
    }
}
