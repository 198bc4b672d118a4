//! Password credential types.
//!
//! Stored credentials are either an unsalted SHA-256 hex digest or, for rows
//! written before hashing was introduced, the plaintext password itself.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Length of a hex-encoded SHA-256 digest.
const DIGEST_HEX_LENGTH: usize = 64;

/// Hash a password into a lowercase hex SHA-256 digest.
///
/// ```
/// use homeservice_core::hash_password;
///
/// let digest = hash_password("hunter2");
/// assert_eq!(digest.len(), 64);
/// assert_eq!(digest, hash_password("hunter2"));
/// ```
#[must_use]
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Verify a password against a stored credential string.
///
/// A stored value shaped like a digest (exactly 64 hex characters, either
/// case) is compared exactly against the password's lowercase digest.
/// Anything else is a legacy plaintext row and is compared directly.
///
/// A legacy plaintext password that is itself 64 hex characters is treated
/// as a digest and will not verify.
#[must_use]
pub fn verify_password(password: &str, stored: &str) -> bool {
    if looks_like_digest(stored) {
        hash_password(password) == stored
    } else {
        stored == password
    }
}

fn looks_like_digest(stored: &str) -> bool {
    stored.len() == DIGEST_HEX_LENGTH && stored.bytes().all(|b| b.is_ascii_hexdigit())
}

/// A stored password credential.
///
/// Serialized as the bare string so persisted rows keep the `password` field
/// shape they have always had.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    /// Hash a plaintext password into a new credential.
    #[must_use]
    pub fn hash(password: &str) -> Self {
        Self(hash_password(password))
    }

    /// Wrap an already-stored credential string (digest or legacy plaintext).
    #[must_use]
    pub const fn from_stored(stored: String) -> Self {
        Self(stored)
    }

    /// Check a password against this credential.
    #[must_use]
    pub fn verify(&self, password: &str) -> bool {
        verify_password(password, &self.0)
    }

    /// Whether the stored value has the shape of a digest.
    #[must_use]
    pub fn is_digest(&self) -> bool {
        looks_like_digest(&self.0)
    }

    /// Whether this is a legacy plaintext credential that should be re-hashed.
    #[must_use]
    pub fn needs_rehash(&self) -> bool {
        !self.is_digest()
    }

    /// Returns the stored credential string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_lowercase_hex_of_fixed_length() {
        let digest = hash_password("correct horse battery staple");
        assert_eq!(digest.len(), 64);
        assert!(digest.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)));
    }

    #[test]
    fn test_hash_known_vector() {
        assert_eq!(
            hash_password("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_verify_roundtrip() {
        for password in ["", "a", "p@ssw0rd", "пароль", "🔑 key with spaces"] {
            assert!(verify_password(password, &hash_password(password)));
        }
    }

    #[test]
    fn test_distinct_passwords_distinct_digests() {
        assert_ne!(hash_password("password1"), hash_password("password2"));
        assert_ne!(hash_password(""), hash_password(" "));
    }

    #[test]
    fn test_verify_rejects_uppercase_digest() {
        let upper = hash_password("secret").to_uppercase();
        assert!(looks_like_digest(&upper));
        assert!(!verify_password("secret", &upper));
        assert!(!Credential::from_stored(upper).verify("secret"));
    }

    #[test]
    fn test_verify_legacy_plaintext() {
        assert!(verify_password("legacy-pass", "legacy-pass"));
        assert!(!verify_password("wrong", "legacy-pass"));
    }

    #[test]
    fn test_verify_wrong_password_against_digest() {
        assert!(!verify_password("wrong", &hash_password("right")));
    }

    #[test]
    fn test_hex_shaped_plaintext_is_treated_as_digest() {
        let plaintext = "a".repeat(64);
        assert!(!verify_password(&plaintext, &plaintext));
    }

    #[test]
    fn test_credential_helpers() {
        let hashed = Credential::hash("pw");
        assert!(hashed.is_digest());
        assert!(!hashed.needs_rehash());
        assert!(hashed.verify("pw"));

        let legacy = Credential::from_stored("pw".to_owned());
        assert!(legacy.needs_rehash());
        assert!(legacy.verify("pw"));
    }
}
