//! Account directory.
//!
//! Maps normalized emails to registered accounts. Passwords are hashed on the
//! way in and checked with the dual-mode verifier from the core crate, so
//! legacy plaintext rows keep working.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;
use tracing::{debug, info, warn};

use homeservice_core::{Credential, NormalizedEmail};

use crate::models::{AccountRecord, NewAccount, UserProfile};

/// Errors that can occur during account operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccountError {
    /// The destination email already belongs to another account.
    #[error("an account with email {0} already exists")]
    DuplicateEmail(NormalizedEmail),
}

/// Registered accounts keyed by normalized email.
///
/// Persists as a JSON object of `normalized email -> profile`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "BTreeMap<String, UserProfile>")]
pub struct AccountDirectory {
    accounts: BTreeMap<NormalizedEmail, AccountRecord>,
}

impl AccountDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether no accounts are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Register an account and return its stored profile.
    ///
    /// Overwrites any existing account with the same normalized email;
    /// callers that must reject duplicates check [`Self::lookup`] first.
    pub fn register(&mut self, account: NewAccount) -> UserProfile {
        let email = NormalizedEmail::new(&account.email);
        let profile = UserProfile {
            name: account.name,
            email: email.clone(),
            phone: account.phone,
            password: Credential::hash(&account.password),
        };

        let previous = self.accounts.insert(
            email.clone(),
            AccountRecord {
                normalized_email: email,
                profile: profile.clone(),
            },
        );
        if previous.is_some() {
            debug!(email = %profile.email, "registration replaced an existing account");
        }

        profile
    }

    /// Find an account by email, ignoring case.
    #[must_use]
    pub fn lookup(&self, email: &str) -> Option<&AccountRecord> {
        self.accounts.get(&NormalizedEmail::new(email))
    }

    /// Check an email/password pair. Unknown emails are simply invalid.
    #[must_use]
    pub fn validate_credentials(&self, email: &str, password: &str) -> bool {
        self.lookup(email)
            .is_some_and(|record| record.credential().verify(password))
    }

    /// Re-hash a legacy plaintext credential after the password was verified.
    ///
    /// Returns the updated profile, or `None` when the account is unknown,
    /// already hashed, or the password does not match.
    pub fn upgrade_legacy_credential(&mut self, email: &str, password: &str) -> Option<UserProfile> {
        let record = self.accounts.get_mut(&NormalizedEmail::new(email))?;
        if !record.profile.password.needs_rehash() || !record.profile.password.verify(password) {
            return None;
        }
        record.profile.password = Credential::hash(password);
        info!(email = %record.normalized_email, "legacy credential upgraded to digest");
        Some(record.profile.clone())
    }

    /// Update name and phone. No-op returning `None` for unknown emails.
    pub fn update_profile(&mut self, email: &str, name: &str, phone: &str) -> Option<UserProfile> {
        let record = self.accounts.get_mut(&NormalizedEmail::new(email))?;
        name.clone_into(&mut record.profile.name);
        phone.clone_into(&mut record.profile.phone);
        Some(record.profile.clone())
    }

    /// Change an account's email and/or password.
    ///
    /// Returns the updated profile, or `Ok(None)` when `old_email` is unknown.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::DuplicateEmail` if the email changes to one that
    /// is already registered. Nothing is modified in that case.
    pub fn update_email_and_password(
        &mut self,
        old_email: &str,
        new_email: &str,
        new_password: Option<&str>,
    ) -> Result<Option<UserProfile>, AccountError> {
        let old_key = NormalizedEmail::new(old_email);
        let new_key = NormalizedEmail::new(new_email);

        if !self.accounts.contains_key(&old_key) {
            return Ok(None);
        }

        if new_key == old_key {
            let Some(record) = self.accounts.get_mut(&old_key) else {
                return Ok(None);
            };
            if let Some(password) = new_password {
                record.profile.password = Credential::hash(password);
            }
            return Ok(Some(record.profile.clone()));
        }

        if self.accounts.contains_key(&new_key) {
            return Err(AccountError::DuplicateEmail(new_key));
        }

        let Some(mut record) = self.accounts.remove(&old_key) else {
            return Ok(None);
        };
        record.normalized_email = new_key.clone();
        record.profile.email = new_key.clone();
        if let Some(password) = new_password {
            record.profile.password = Credential::hash(password);
        }
        let profile = record.profile.clone();
        self.accounts.insert(new_key, record);

        info!(from = %old_key, to = %profile.email, "account email changed");
        Ok(Some(profile))
    }
}

impl From<BTreeMap<String, UserProfile>> for AccountDirectory {
    fn from(rows: BTreeMap<String, UserProfile>) -> Self {
        let accounts = rows
            .into_iter()
            .map(|(key, mut profile)| {
                let normalized_email = NormalizedEmail::new(&key);
                if profile.email != normalized_email {
                    if !profile.email.is_empty() {
                        warn!(
                            key = %normalized_email,
                            email = %profile.email,
                            "profile email differs from its key, using the key"
                        );
                    }
                    profile.email = normalized_email.clone();
                }
                (
                    normalized_email.clone(),
                    AccountRecord {
                        normalized_email,
                        profile,
                    },
                )
            })
            .collect();
        Self { accounts }
    }
}

impl Serialize for AccountDirectory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(
            self.accounts
                .iter()
                .map(|(email, record)| (email.as_str(), &record.profile)),
        )
    }
}
