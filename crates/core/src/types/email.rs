//! Normalized email address type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when validating an email before it reaches the core.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// The input string is empty.
    #[error("email cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("email must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input does not contain an @ symbol.
    #[error("email must contain an @ symbol")]
    MissingAtSymbol,
    /// The local part (before @) is empty.
    #[error("email local part cannot be empty")]
    EmptyLocalPart,
    /// The domain part (after @) is empty.
    #[error("email domain cannot be empty")]
    EmptyDomain,
}

/// A lowercase-folded email address, the unique identity of an account.
///
/// Construction never fails: the core only normalizes, it does not validate.
/// Shape checks belong to whoever collects the input, see [`NormalizedEmail::parse`].
/// An empty value is allowed and means "no owner" on bookings.
///
/// ## Examples
///
/// ```
/// use homeservice_core::NormalizedEmail;
///
/// let email = NormalizedEmail::new("USER@Example.com");
/// assert_eq!(email.as_str(), "user@example.com");
/// assert!(email.matches("User@EXAMPLE.com"));
///
/// assert!(NormalizedEmail::parse("no-at-symbol").is_err());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(from = "String", into = "String")]
pub struct NormalizedEmail(String);

impl NormalizedEmail {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Normalize an email string by lowercasing it.
    #[must_use]
    pub fn new(s: &str) -> Self {
        Self(s.to_lowercase())
    }

    /// Validate the structure of an email and normalize it.
    ///
    /// # Errors
    ///
    /// Returns an error if the input:
    /// - Is empty
    /// - Is longer than 254 characters
    /// - Does not contain an @ symbol
    /// - Has an empty local part or domain
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(EmailError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let at_pos = s.find('@').ok_or(EmailError::MissingAtSymbol)?;

        if at_pos == 0 {
            return Err(EmailError::EmptyLocalPart);
        }

        if at_pos == s.len() - 1 {
            return Err(EmailError::EmptyDomain);
        }

        Ok(Self::new(s))
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `NormalizedEmail` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Whether this is the empty (unowned) email.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Case-insensitive comparison against a raw email string.
    #[must_use]
    pub fn matches(&self, other: &str) -> bool {
        self.0 == other.to_lowercase()
    }
}

impl fmt::Display for NormalizedEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for NormalizedEmail {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for NormalizedEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for NormalizedEmail {
    fn from(s: String) -> Self {
        Self::new(&s)
    }
}

impl From<&str> for NormalizedEmail {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<NormalizedEmail> for String {
    fn from(email: NormalizedEmail) -> Self {
        email.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_lowercases() {
        let email = NormalizedEmail::new("USER@Example.COM");
        assert_eq!(email.as_str(), "user@example.com");
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let email = NormalizedEmail::new("user@example.com");
        assert!(email.matches("USER@example.com"));
        assert!(!email.matches("other@example.com"));
    }

    #[test]
    fn test_empty_is_allowed() {
        let email = NormalizedEmail::default();
        assert!(email.is_empty());
        assert!(!email.matches("user@example.com"));
    }

    #[test]
    fn test_parse_valid_emails() {
        assert!(NormalizedEmail::parse("user@example.com").is_ok());
        assert!(NormalizedEmail::parse("user+tag@example.com").is_ok());
        assert!(NormalizedEmail::parse("a@b.c").is_ok());
    }

    #[test]
    fn test_parse_trims_and_normalizes() {
        let email = NormalizedEmail::parse("  Jane@Example.com ").unwrap();
        assert_eq!(email.as_str(), "jane@example.com");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(NormalizedEmail::parse(""), Err(EmailError::Empty));
        assert_eq!(
            NormalizedEmail::parse("no-at-symbol"),
            Err(EmailError::MissingAtSymbol)
        );
        assert_eq!(
            NormalizedEmail::parse("@domain.com"),
            Err(EmailError::EmptyLocalPart)
        );
        assert_eq!(NormalizedEmail::parse("user@"), Err(EmailError::EmptyDomain));

        let long = format!("{}@example.com", "a".repeat(250));
        assert!(matches!(
            NormalizedEmail::parse(&long),
            Err(EmailError::TooLong { .. })
        ));
    }

    #[test]
    fn test_deserialize_normalizes() {
        let email: NormalizedEmail = serde_json::from_str("\"Mixed@Case.org\"").unwrap();
        assert_eq!(email.as_str(), "mixed@case.org");

        let json = serde_json::to_string(&email).unwrap();
        assert_eq!(json, "\"mixed@case.org\"");
    }
}
