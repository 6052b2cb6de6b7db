//! This module contains the syntactic email address checker that is consulted for the value of an
//! Attribute Exchange email attribute.
//!
//! The checker is deliberately simple: it only decides whether a string *looks* like an email
//! address, it does not resolve domains or check deliverability.

use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum length of a complete address.
const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum length of the part before the `@`.
const MAX_LOCAL_PART_LENGTH: usize = 64;

// ASCII-only, case-insensitive: `LOCAL@DOMAIN` with at least one dot in the domain.
static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?i-u)[\w.!#$%&'*+\-/=?^`{|}~]+@[a-z\d-]+(\.[a-z\d-]+)+$").unwrap());

/// Implementations of this trait decide whether a candidate string is a syntactically valid email
/// address. They must be deterministic and free of side effects.
///
/// Any `Fn(&str) -> bool` closure can be used as a checker:
///
/// ```
/// use gmail_openid_bridge::email::EmailSyntax;
///
/// let gmail_only = |candidate: &str| candidate.ends_with("@gmail.com");
/// assert!(gmail_only.is_valid("alice@gmail.com"));
/// ```
pub trait EmailSyntax: Send + Sync {
    /// This method returns `true` if the candidate is an acceptable email address.
    fn is_valid(&self, candidate: &str) -> bool;
}

impl<F> EmailSyntax for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_valid(&self, candidate: &str) -> bool {
        self(candidate)
    }
}

/// The default email syntax checker.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleEmailSyntax;

impl EmailSyntax for SimpleEmailSyntax {
    fn is_valid(&self, candidate: &str) -> bool {
        if candidate.len() > MAX_EMAIL_LENGTH {
            return false;
        }

        if !EMAIL_PATTERN.is_match(candidate) {
            return false;
        }

        // the pattern guarantees exactly one '@', since it is not part of the allowed characters
        match candidate.split_once('@') {
            Some((local, _domain)) => local.len() <= MAX_LOCAL_PART_LENGTH,
            None => false,
        }
    }
}

/// This function checks an optional candidate with the default checker. A missing value is never
/// a valid email address.
pub fn valid(candidate: Option<&str>) -> bool {
    match candidate {
        Some(candidate) => SimpleEmailSyntax.is_valid(candidate),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(valid(Some("alice@gmail.com")));
        assert!(valid(Some("Alice.Smith+tag@Mail.Example.org")));
        assert!(valid(Some("o'brien@sub-domain.example.co.uk")));
    }

    #[test]
    fn rejects_missing_value() {
        assert!(!valid(None));
        assert!(!valid(Some("")));
    }

    #[test]
    fn rejects_malformed_addresses() {
        for candidate in [
            "alice",
            "alice@",
            "@gmail.com",
            "alice@gmail",
            "alice@@gmail.com",
            "alice@gmail..com",
            "alice@gmail.com.",
            "alice smith@gmail.com",
            "alice@gmail.com\n",
            "alice@exa_mple.com",
            "ålice@gmail.com",
        ] {
            assert!(!valid(Some(candidate)), "{:?} should be rejected", candidate);
        }
    }

    #[test]
    fn enforces_length_limits() {
        let local = "a".repeat(MAX_LOCAL_PART_LENGTH);
        assert!(valid(Some(&format!("{}@gmail.com", local))));

        let local = "a".repeat(MAX_LOCAL_PART_LENGTH + 1);
        assert!(!valid(Some(&format!("{}@gmail.com", local))));

        let domain = format!("{}.com", "b".repeat(MAX_EMAIL_LENGTH));
        assert!(!valid(Some(&format!("alice@{}", domain))));
    }

    #[test]
    fn closures_are_checkers() {
        let never = |_: &str| false;
        assert!(!never.is_valid("alice@gmail.com"));
    }
}
