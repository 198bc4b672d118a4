//! Notification log.
//!
//! Append-only record of booking events, rendered as short human-readable
//! messages. Entries are never edited, deduplicated or evicted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use homeservice_core::NotificationId;

use crate::models::{Booking, NotificationEntry};

/// Format used for dates inside notification messages.
const MESSAGE_DATE_FORMAT: &str = "%b %-d, %Y at %H:%M";

/// Ordered notification entries, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationLog {
    entries: Vec<NotificationEntry>,
}

impl NotificationLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message stamped with `now`.
    pub fn record(&mut self, message: impl Into<String>, now: DateTime<Utc>) -> NotificationId {
        let entry = NotificationEntry::new(message.into(), now);
        let id = entry.id();
        self.entries.push(entry);
        id
    }

    /// All entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[NotificationEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Message recorded when a booking is created.
#[must_use]
pub fn booking_created_message(booking: &Booking) -> String {
    format!(
        "Booking confirmed: {} in {} on {}",
        booking.service_name(),
        booking.province_name(),
        booking.scheduled_at().format(MESSAGE_DATE_FORMAT)
    )
}

/// Message recorded when a booking is cancelled.
#[must_use]
pub fn booking_cancelled_message(booking: &Booking) -> String {
    format!(
        "Booking cancelled: {} scheduled for {}",
        booking.service_name(),
        booking.scheduled_at().format(MESSAGE_DATE_FORMAT)
    )
}
