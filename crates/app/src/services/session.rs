//! Signed-in user session.
//!
//! Holds a copy of the current user's profile. Only the email is persisted;
//! on startup it is resolved back through the account directory.

use tracing::{debug, warn};

use homeservice_core::NormalizedEmail;

use super::AccountDirectory;
use crate::models::UserProfile;

/// The current authenticated user, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    current: Option<UserProfile>,
}

impl Session {
    /// Make `profile` the current user.
    pub fn log_in(&mut self, profile: UserProfile) {
        debug!(email = %profile.email, "session started");
        self.current = Some(profile);
    }

    /// Clear the current user.
    pub fn log_out(&mut self) {
        if let Some(profile) = self.current.take() {
            debug!(email = %profile.email, "session ended");
        }
    }

    /// The current user's profile.
    #[must_use]
    pub const fn current(&self) -> Option<&UserProfile> {
        self.current.as_ref()
    }

    /// The current user's normalized email.
    #[must_use]
    pub fn current_email(&self) -> Option<&NormalizedEmail> {
        self.current.as_ref().map(|p| &p.email)
    }

    /// Whether someone is signed in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    /// Rehydrate from a persisted email.
    ///
    /// Returns `true` when the email resolved to an account. An email that no
    /// longer resolves clears the session.
    pub fn restore(&mut self, persisted_email: Option<&str>, directory: &AccountDirectory) -> bool {
        let Some(email) = persisted_email else {
            self.current = None;
            return false;
        };

        if let Some(record) = directory.lookup(email) {
            self.current = Some(record.profile.clone());
            true
        } else {
            warn!(email, "persisted session does not match any account, clearing");
            self.current = None;
            false
        }
    }

    /// Replace the session copy after the directory entry for `previous_email`
    /// changed. No-op when someone else (or nobody) is signed in.
    pub fn refresh(&mut self, previous_email: &NormalizedEmail, profile: &UserProfile) {
        if let Some(current) = self.current.as_mut()
            && current.email == *previous_email
        {
            current.clone_from(profile);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::NewAccount;

    fn directory() -> AccountDirectory {
        let mut directory = AccountDirectory::new();
        directory.register(NewAccount::new("Ada", "ada@x.com", "1", "pw"));
        directory
    }

    #[test]
    fn test_log_in_and_out() {
        let directory = directory();
        let mut session = Session::default();
        assert!(!session.is_authenticated());

        session.log_in(directory.lookup("ada@x.com").unwrap().profile.clone());
        assert_eq!(session.current_email().unwrap().as_str(), "ada@x.com");

        session.log_out();
        assert!(session.current().is_none());
    }

    #[test]
    fn test_restore_resolves_through_directory() {
        let directory = directory();
        let mut session = Session::default();
        assert!(session.restore(Some("ADA@x.com"), &directory));
        assert_eq!(session.current().unwrap().name, "Ada");
    }

    #[test]
    fn test_restore_clears_stale_email() {
        let directory = directory();
        let mut session = Session::default();
        session.log_in(directory.lookup("ada@x.com").unwrap().profile.clone());

        assert!(!session.restore(Some("gone@x.com"), &directory));
        assert!(session.current().is_none());
        assert!(!session.restore(None, &directory));
    }

    #[test]
    fn test_refresh_only_touches_matching_user() {
        let mut directory = directory();
        let mut session = Session::default();
        session.log_in(directory.lookup("ada@x.com").unwrap().profile.clone());

        let other = directory.register(NewAccount::new("Bob", "bob@x.com", "2", "pw"));
        session.refresh(&other.email, &other);
        assert_eq!(session.current().unwrap().name, "Ada");

        let updated = directory.update_profile("ada@x.com", "Ada L.", "3").unwrap();
        session.refresh(&NormalizedEmail::new("ada@x.com"), &updated);
        assert_eq!(session.current().unwrap().name, "Ada L.");
        assert_eq!(session.current().unwrap().phone, "3");
    }
}
