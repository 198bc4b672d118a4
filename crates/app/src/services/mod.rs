//! In-memory services composed by the app state.
//!
//! Each service owns one slice of state and knows nothing about persistence
//! or other services; [`crate::state::AppState`] wires them together.

pub mod accounts;
pub mod bookings;
pub mod notifications;
pub mod session;

pub use accounts::{AccountDirectory, AccountError};
pub use bookings::{BookingLedger, filter_by_owner};
pub use notifications::NotificationLog;
pub use session::Session;
