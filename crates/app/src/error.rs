//! Unified error handling with Sentry integration.
//!
//! The core only ever surfaces [`AccountError::DuplicateEmail`]; storage and
//! parse failures are logged where they happen. `AppError` gathers those
//! alongside the input errors a front end produces while collecting data, so
//! a caller has a single type to report and render.

use thiserror::Error;

use homeservice_core::{CatalogError, EmailError, ProvinceError};

use crate::config::ConfigError;
use crate::services::AccountError;
use crate::storage::StorageError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Account operation failed.
    #[error("Account error: {0}")]
    Account(#[from] AccountError),

    /// Key-value store operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Service catalog could not be loaded.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Email input is malformed.
    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),

    /// Province input is not one of the served provinces.
    #[error("Invalid province: {0}")]
    Province(#[from] ProvinceError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad input from the user.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Whether this error reflects a fault in the app rather than bad input.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Config(_) | Self::Catalog(_))
    }

    /// Message safe to show to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Account(AccountError::DuplicateEmail(email)) => {
                format!("An account with {email} already exists")
            }
            Self::Storage(_) => "Could not access saved data".to_string(),
            Self::Config(_) | Self::Catalog(_) => "The app is misconfigured".to_string(),
            Self::Email(err) => format!("Invalid email address: {err}"),
            Self::Province(err) => err.to_string(),
            Self::NotFound(what) => format!("{what} not found"),
            Self::Unauthorized(msg) | Self::BadRequest(msg) => msg.clone(),
        }
    }

    /// Capture internal errors to Sentry and log them.
    pub fn report(&self) {
        if self.is_internal() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Internal error"
            );
        } else {
            tracing::debug!(error = %self, "User-facing error");
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from an email.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(email: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            email: Some(email.to_owned()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("booking", "Booking created", Some(&[("booking_id", "…")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use homeservice_core::NormalizedEmail;

    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("Booking 123".to_string());
        assert_eq!(err.to_string(), "Not found: Booking 123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_duplicate_email_message() {
        let err = AppError::from(AccountError::DuplicateEmail(NormalizedEmail::new("b@x.com")));
        assert!(!err.is_internal());
        assert_eq!(err.user_message(), "An account with b@x.com already exists");
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let err = AppError::from(StorageError::Unavailable("disk on fire".to_string()));
        assert!(err.is_internal());
        assert!(!err.user_message().contains("disk on fire"));
    }

    #[test]
    fn test_report_without_sentry_client_is_noop() {
        AppError::from(StorageError::InvalidKey("x/y".to_string())).report();
        AppError::Unauthorized("sign in first".to_string()).report();
        set_sentry_user("a@x.com");
        add_breadcrumb("booking", "Booking created", Some(&[("id", "1")]));
        clear_sentry_user();
    }
}
