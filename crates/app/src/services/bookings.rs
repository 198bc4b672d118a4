//! Booking ledger.
//!
//! An ordered list of bookings. Insertion order is the canonical order for
//! listing. Bookings are never removed: cancellation sets a flag in place.

use serde::{Deserialize, Serialize};
use tracing::debug;

use homeservice_core::{BookingId, NormalizedEmail};

use crate::models::{Booking, NewBooking};

/// All bookings, in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingLedger {
    bookings: Vec<Booking>,
}

impl BookingLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new booking and return a copy of it.
    ///
    /// The owner is the explicit one from `input` when non-empty, otherwise
    /// the signed-in user, otherwise empty.
    pub fn add(&mut self, input: NewBooking, session_email: Option<&NormalizedEmail>) -> Booking {
        let owner = input
            .owner_email
            .as_deref()
            .map(NormalizedEmail::new)
            .filter(|email| !email.is_empty())
            .or_else(|| session_email.cloned())
            .unwrap_or_default();

        let booking = Booking::create(input, owner);
        debug!(id = %booking.id(), owner = %booking.owner_email(), "booking added");
        self.bookings.push(booking.clone());
        booking
    }

    /// Flag a booking as cancelled. Returns the updated booking, or `None`
    /// when no booking has that ID.
    pub fn cancel(&mut self, id: BookingId) -> Option<Booking> {
        let booking = self.bookings.iter_mut().find(|b| b.id() == id)?;
        booking.mark_cancelled();
        Some(booking.clone())
    }

    /// Find a booking by ID.
    #[must_use]
    pub fn get(&self, id: BookingId) -> Option<&Booking> {
        self.bookings.iter().find(|b| b.id() == id)
    }

    /// All bookings in creation order.
    #[must_use]
    pub fn all(&self) -> &[Booking] {
        &self.bookings
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }
}

/// Bookings owned by `email`, compared case-insensitively.
///
/// With no email every booking is returned. This permissive default serves
/// signed-out and administrative views.
#[must_use]
pub fn filter_by_owner<'a>(all: &'a [Booking], email: Option<&str>) -> Vec<&'a Booking> {
    match email {
        None => all.iter().collect(),
        Some(email) => {
            let email = NormalizedEmail::new(email);
            all.iter().filter(|b| *b.owner_email() == email).collect()
        }
    }
}
