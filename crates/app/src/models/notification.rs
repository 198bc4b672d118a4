//! Notification log entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use homeservice_core::NotificationId;

/// One human-readable event in the notification log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEntry {
    #[serde(default)]
    id: NotificationId,
    #[serde(default)]
    message: String,
    #[serde(default = "Utc::now")]
    created_at: DateTime<Utc>,
}

impl NotificationEntry {
    pub(crate) fn new(message: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id: NotificationId::new(),
            message,
            created_at,
        }
    }

    #[must_use]
    pub const fn id(&self) -> NotificationId {
        self.id
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
