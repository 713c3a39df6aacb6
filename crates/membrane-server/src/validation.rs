//! Request validation for the email verification endpoint.
//!
//! Addresses are matched against a configurable pattern anchored at the start
//! of the input, so a pattern such as `[^@]+@example\.org` admits
//! `user@example.org` and also anything that merely starts that way. Anchor
//! with `$` to require a full match.

use regex::Regex;
use url::Url;

/// Why a submitted address was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmailError {
    #[error("Missing email.")]
    Missing,

    #[error("Invalid email address.")]
    Invalid,
}

/// Compiled allow-pattern for email addresses.
#[derive(Debug, Clone)]
pub struct EmailValidator {
    pattern: Regex,
}

impl EmailValidator {
    /// Compiles `pattern`, anchoring it at the start of the input.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!("^(?:{pattern})"))?;
        Ok(Self { pattern })
    }

    /// Returns the trimmed address if it is present and allowed.
    pub fn validate<'a>(&self, email: Option<&'a str>) -> Result<&'a str, EmailError> {
        let email = email.map(str::trim).unwrap_or_default();
        if email.is_empty() {
            return Err(EmailError::Missing);
        }
        if !self.pattern.is_match(email) {
            return Err(EmailError::Invalid);
        }
        Ok(email)
    }
}

/// Checks that a redirect target is an absolute http(s) URL.
pub fn validate_redirect_url(raw: Option<&str>) -> Option<Url> {
    let url = Url::parse(raw?.trim()).ok()?;
    matches!(url.scheme(), "http" | "https").then_some(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_empty_addresses() {
        let validator = EmailValidator::new("").unwrap();
        assert_eq!(validator.validate(None), Err(EmailError::Missing));
        assert_eq!(validator.validate(Some("  ")), Err(EmailError::Missing));
        // An empty pattern admits any address.
        assert_eq!(validator.validate(Some("anything")), Ok("anything"));
    }

    #[test]
    fn pattern_is_a_prefix_match() {
        let validator = EmailValidator::new(r"[^@\s]+@example\.org").unwrap();
        assert!(validator.validate(Some("ann@example.org")).is_ok());
        assert!(validator.validate(Some("ann@example.org.evil")).is_ok());
        assert_eq!(
            validator.validate(Some("x ann@example.org")),
            Err(EmailError::Invalid)
        );
        assert_eq!(
            validator.validate(Some("ann@example.com")),
            Err(EmailError::Invalid)
        );
    }

    #[test]
    fn anchored_pattern_requires_full_match() {
        let validator = EmailValidator::new(r"[^@\s]+@example\.org$").unwrap();
        assert!(validator.validate(Some("ann@example.org")).is_ok());
        assert_eq!(
            validator.validate(Some("ann@example.org.evil")),
            Err(EmailError::Invalid)
        );
    }

    #[test]
    fn alternation_stays_anchored() {
        let validator = EmailValidator::new(r"a@x\.io|b@y\.io").unwrap();
        assert!(validator.validate(Some("b@y.io")).is_ok());
        assert_eq!(validator.validate(Some("zb@y.io")), Err(EmailError::Invalid));
    }

    #[test]
    fn invalid_pattern() {
        assert!(EmailValidator::new("(").is_err());
    }

    #[test]
    fn redirect_urls() {
        assert!(validate_redirect_url(Some("https://app.example/done")).is_some());
        assert!(validate_redirect_url(Some("/relative")).is_none());
        assert!(validate_redirect_url(Some("javascript:alert(1)")).is_none());
        assert!(validate_redirect_url(None).is_none());
    }
}
