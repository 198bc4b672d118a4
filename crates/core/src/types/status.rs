//! Booking status derivation.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Bookings at most this many hours away are upcoming.
const UPCOMING_WINDOW_HOURS: i64 = 24;

/// Display status of a booking.
///
/// Never persisted: always derived from the booking's schedule and the
/// current time with [`BookingStatus::derive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// The booking was cancelled, whatever its date.
    Cancelled,
    /// The scheduled time has passed.
    Completed,
    /// Scheduled within the next day.
    Upcoming,
    /// Scheduled more than a day out.
    Scheduled,
}

impl BookingStatus {
    /// How far ahead a booking counts as upcoming.
    #[must_use]
    pub fn upcoming_window() -> Duration {
        Duration::hours(UPCOMING_WINDOW_HOURS)
    }

    /// Derive the status of a booking at `now`.
    ///
    /// ```
    /// use chrono::{Duration, Utc};
    /// use homeservice_core::BookingStatus;
    ///
    /// let now = Utc::now();
    /// assert_eq!(BookingStatus::derive(now + Duration::hours(12), false, now), BookingStatus::Upcoming);
    /// assert_eq!(BookingStatus::derive(now - Duration::days(1), false, now), BookingStatus::Completed);
    /// ```
    #[must_use]
    pub fn derive(scheduled_at: DateTime<Utc>, cancelled: bool, now: DateTime<Utc>) -> Self {
        if cancelled {
            Self::Cancelled
        } else if scheduled_at < now {
            Self::Completed
        } else if scheduled_at - now <= Self::upcoming_window() {
            Self::Upcoming
        } else {
            Self::Scheduled
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cancelled => write!(f, "Cancelled"),
            Self::Completed => write!(f, "Completed"),
            Self::Upcoming => write!(f, "Upcoming"),
            Self::Scheduled => write!(f, "Scheduled"),
        }
    }
}
