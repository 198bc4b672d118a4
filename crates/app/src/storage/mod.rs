//! Key-value persistence gateway.
//!
//! The app state persists into four independent string slots (see [`keys`]).
//! Anything that can get, set and remove strings by key can back it:
//!
//! - [`MemoryStore`] - in-process map, for tests and throwaway runs
//! - [`FileStore`] - one file per slot under a data directory
//!
//! Writes to different slots are independent; there is no transaction
//! spanning them.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by a [`KeyValueStore`].
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem or device error.
    #[error("I/O error on slot {key}: {source}")]
    Io {
        /// Slot being accessed.
        key: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Key cannot be mapped onto the backing store.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// Backend refused the operation.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Async string key-value store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a slot. Missing slots are `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a slot, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> Result<()>;

    /// Delete a slot. Removing a missing slot is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Slot names for persisted app state.
pub mod keys {
    /// Map of normalized email to user profile.
    pub const REGISTERED_USERS: &str = "registeredUsers";

    /// Ordered list of bookings.
    pub const BOOKINGS: &str = "bookings";

    /// Ordered list of notification entries.
    pub const NOTIFICATIONS: &str = "notifications";

    /// Normalized email of the signed-in user, absent when signed out.
    pub const CURRENT_USER_EMAIL: &str = "currentUserEmail";
}

/// Concrete slot names, optionally namespaced with a prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotKeys {
    pub registered_users: String,
    pub bookings: String,
    pub notifications: String,
    pub current_user_email: String,
}

impl SlotKeys {
    /// Slot names with `prefix` prepended to each.
    #[must_use]
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            registered_users: format!("{prefix}{}", keys::REGISTERED_USERS),
            bookings: format!("{prefix}{}", keys::BOOKINGS),
            notifications: format!("{prefix}{}", keys::NOTIFICATIONS),
            current_user_email: format!("{prefix}{}", keys::CURRENT_USER_EMAIL),
        }
    }
}

impl Default for SlotKeys {
    fn default() -> Self {
        Self::with_prefix("")
    }
}
