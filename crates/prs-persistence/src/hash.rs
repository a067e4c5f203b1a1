//! Header fingerprints for remembered templates.

use sha2::{Digest, Sha256};

use prs_model::SectionKind;

/// Normalize a header for comparison: lowercase, separators collapsed to `_`.
pub fn normalize_header(header: &str) -> String {
    let mut out = String::with_capacity(header.len());
    let mut pending_sep = false;
    for c in header.trim().chars() {
        if c.is_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.extend(c.to_lowercase());
        } else {
            pending_sep = true;
        }
    }
    out
}

/// SHA-256 fingerprint of a section's normalized header row.
///
/// Two header rows that differ only in case, whitespace or punctuation share
/// a fingerprint.
pub fn header_fingerprint<S: AsRef<str>>(section: SectionKind, headers: &[S]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(section.as_str().as_bytes());
    for header in headers {
        hasher.update([0x1f]);
        hasher.update(normalize_header(header.as_ref()).as_bytes());
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_separators() {
        assert_eq!(normalize_header("  Gross  Pay "), "gross_pay");
        assert_eq!(normalize_header("YTD-Amount ($)"), "ytd_amount");
        assert_eq!(normalize_header("---"), "");
    }

    #[test]
    fn fingerprint_ignores_cosmetic_differences() {
        let a = header_fingerprint(SectionKind::Earnings, &["Code", "Gross Pay"]);
        let b = header_fingerprint(SectionKind::Earnings, &["CODE", "gross-pay"]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn fingerprint_depends_on_section_and_order() {
        let earnings = header_fingerprint(SectionKind::Earnings, &["Code", "Amount"]);
        let taxes = header_fingerprint(SectionKind::Taxes, &["Code", "Amount"]);
        let swapped = header_fingerprint(SectionKind::Earnings, &["Amount", "Code"]);
        assert_ne!(earnings, taxes);
        assert_ne!(earnings, swapped);
    }
}
