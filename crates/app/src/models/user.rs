//! User domain types.

use serde::{Deserialize, Serialize};

use homeservice_core::{Credential, NormalizedEmail};

/// A registered user's profile.
///
/// `password` holds the stored credential, never the plaintext (except for
/// legacy rows written before hashing). Implements `Debug` manually to redact
/// it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Normalized email, the account identity.
    #[serde(default)]
    pub email: NormalizedEmail,
    /// Contact phone number.
    #[serde(default)]
    pub phone: String,
    /// Stored credential (digest or legacy plaintext).
    #[serde(default)]
    pub password: Credential,
}

impl std::fmt::Debug for UserProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserProfile")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Registration input, carrying the plaintext password until it is hashed.
#[derive(Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

impl NewAccount {
    /// Create registration input.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAccount")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// A directory entry: the normalized email key and the profile it owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    /// Lowercased email, unique across the directory.
    pub normalized_email: NormalizedEmail,
    /// The profile, whose `password` is the record's credential.
    pub profile: UserProfile,
}

impl AccountRecord {
    /// The stored credential.
    #[must_use]
    pub const fn credential(&self) -> &Credential {
        &self.profile.password
    }
}
