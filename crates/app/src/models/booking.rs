//! Booking domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use homeservice_core::{BookingId, BookingStatus, NormalizedEmail, Province};

/// A booked service visit.
///
/// Bookings are created by the ledger from a [`NewBooking`]. The owner is
/// fixed at creation and cancellation only ever flips the flag, so the
/// fields are read through accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(default)]
    id: BookingId,
    #[serde(default)]
    service_name: String,
    #[serde(default)]
    province: String,
    #[serde(default = "Utc::now")]
    scheduled_at: DateTime<Utc>,
    #[serde(default)]
    notes: String,
    #[serde(default)]
    owner_email: NormalizedEmail,
    #[serde(default)]
    cancelled: bool,
}

impl Booking {
    pub(crate) fn create(input: NewBooking, owner_email: NormalizedEmail) -> Self {
        Self {
            id: BookingId::new(),
            service_name: input.service_name,
            province: input.province.name().to_owned(),
            scheduled_at: input.scheduled_at,
            notes: input.notes,
            owner_email,
            cancelled: false,
        }
    }

    pub(crate) const fn mark_cancelled(&mut self) {
        self.cancelled = true;
    }

    /// Unique booking ID.
    #[must_use]
    pub const fn id(&self) -> BookingId {
        self.id
    }

    /// Service label, possibly `"Category - Subcategory"`.
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Province name as stored.
    #[must_use]
    pub fn province_name(&self) -> &str {
        &self.province
    }

    /// Province, if the stored name is a known one.
    #[must_use]
    pub fn province(&self) -> Option<Province> {
        self.province.parse().ok()
    }

    /// When the visit is scheduled.
    #[must_use]
    pub const fn scheduled_at(&self) -> DateTime<Utc> {
        self.scheduled_at
    }

    /// Free-text notes.
    #[must_use]
    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Owner's normalized email, empty for unowned bookings.
    #[must_use]
    pub const fn owner_email(&self) -> &NormalizedEmail {
        &self.owner_email
    }

    /// Whether the booking was cancelled.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Status of this booking at `now`.
    #[must_use]
    pub fn status(&self, now: DateTime<Utc>) -> BookingStatus {
        BookingStatus::derive(self.scheduled_at, self.cancelled, now)
    }
}

/// Input for creating a booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub service_name: String,
    pub province: Province,
    pub scheduled_at: DateTime<Utc>,
    pub notes: String,
    /// Explicit owner. When absent the ledger uses the session user.
    pub owner_email: Option<String>,
}

impl NewBooking {
    /// Create booking input with no notes and no explicit owner.
    #[must_use]
    pub fn new(
        service_name: impl Into<String>,
        province: Province,
        scheduled_at: DateTime<Utc>,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            province,
            scheduled_at,
            notes: String::new(),
            owner_email: None,
        }
    }

    /// Attach notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Set an explicit owner.
    #[must_use]
    pub fn with_owner(mut self, email: impl Into<String>) -> Self {
        self.owner_email = Some(email.into());
        self
    }
}
