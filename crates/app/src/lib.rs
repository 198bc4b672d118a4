//! Home service app library.
//!
//! Owns the in-memory state of the booking app: registered accounts, the
//! signed-in session, the booking ledger and the notification log. Everything
//! is reached through [`AppState`], which persists into a pluggable
//! [`KeyValueStore`] and publishes snapshots to observers.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{AppConfig, StorageBackend};
pub use error::{AppError, Result};
pub use state::{AppSnapshot, AppState};
pub use storage::{FileStore, KeyValueStore, MemoryStore, SlotKeys, StorageError};
