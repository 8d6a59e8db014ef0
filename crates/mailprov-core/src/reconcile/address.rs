//! Email address comparisons shared by creation and deletion.

/// Builds the address a local part maps to under a domain.
#[must_use]
pub fn expected_email(local_part: &str, domain: &str) -> String {
    format!("{local_part}@{domain}")
}

/// Compares two addresses, ignoring case and surrounding whitespace.
#[must_use]
pub fn emails_match(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Domain part of an address, if it has one.
#[must_use]
pub fn domain_of(email: &str) -> Option<&str> {
    email
        .trim()
        .rsplit_once('@')
        .map(|(_, domain)| domain)
        .filter(|domain| !domain.is_empty())
}

/// Whether an address belongs to a domain (case-insensitive).
#[must_use]
pub fn domain_matches(email: &str, domain: &str) -> bool {
    domain_of(email).is_some_and(|d| d.eq_ignore_ascii_case(domain.trim()))
}
