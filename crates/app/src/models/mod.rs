//! Domain models for the booking app.
//!
//! Every model serializes with camelCase field names and tolerates missing
//! fields on read, so rows written by older builds keep loading.

pub mod booking;
pub mod notification;
pub mod user;

pub use booking::{Booking, NewBooking};
pub use notification::NotificationEntry;
pub use user::{AccountRecord, NewAccount, UserProfile};
