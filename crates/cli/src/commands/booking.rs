//! Booking, notification and catalog commands.
//!
//! # Usage
//!
//! ```bash
//! hs-cli categories
//! hs-cli book -s "Home Cleaning - Deep Cleaning" --province "Nova Scotia" --at 2026-05-01T10:00:00Z
//! hs-cli bookings --all
//! hs-cli cancel 5f0c7f9e-8d2b-4a51-9a57-0e3f3f6f2a10
//! hs-cli notifications
//! ```

use chrono::{DateTime, NaiveDateTime, Utc};

use homeservice_app::models::{Booking, NewBooking};
use homeservice_app::{AppError, AppState};
use homeservice_core::{BookingId, Catalog, Province};

use super::output;

/// Accepted alternative to RFC 3339, interpreted as UTC.
const PLAIN_DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Display format for booking dates.
const LIST_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Book a service for the signed-in user.
///
/// # Errors
///
/// Returns an error if the service label is not in the catalog, the province
/// is unknown, or the date is malformed or in the past.
pub async fn book(
    state: &AppState,
    service: &str,
    province: &str,
    at: &str,
    notes: String,
) -> Result<(), AppError> {
    let catalog = Catalog::builtin()?;
    let service_name = canonical_label(&catalog, service)?;
    let province: Province = province.parse()?;
    let scheduled_at = parse_date_time(at)?;
    if scheduled_at <= state.now() {
        return Err(AppError::BadRequest(
            "Choose a date and time in the future".to_string(),
        ));
    }

    let booking = state
        .add_booking(NewBooking::new(service_name, province, scheduled_at).with_notes(notes))
        .await;

    output::line(format_args!("Booked {}", booking.service_name()));
    output::line(format_args!("ID: {}", booking.id()));
    Ok(())
}

/// Cancel a booking by ID.
///
/// # Errors
///
/// Returns an error if the ID is malformed, unknown, or owned by another
/// account than the signed-in one.
pub async fn cancel(state: &AppState, id: &str) -> Result<(), AppError> {
    let id: BookingId = id
        .trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("`{id}` is not a booking ID")))?;
    let booking = state
        .booking(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Booking {id}")))?;

    if let Some(user) = state.current_user().await
        && !booking.owner_email().is_empty()
        && *booking.owner_email() != user.email
    {
        return Err(AppError::Unauthorized(
            "That booking belongs to another account".to_string(),
        ));
    }

    if booking.is_cancelled() {
        tracing::info!(%id, "Booking was already cancelled");
    }
    state.cancel_booking(&booking).await;

    output::line(format_args!("Cancelled {}", booking.service_name()));
    Ok(())
}

/// List bookings of the signed-in user, or every booking with `all`.
///
/// # Errors
///
/// Never fails; returns `Result` for symmetry with the other commands.
pub async fn list(state: &AppState, all: bool) -> Result<(), AppError> {
    let bookings = if all {
        state.bookings().await
    } else {
        state.bookings_for_current_user().await
    };

    if bookings.is_empty() {
        output::line("No bookings");
        return Ok(());
    }
    for booking in &bookings {
        output::line(format_booking(state, booking));
    }
    Ok(())
}

/// List notifications, newest first.
///
/// # Errors
///
/// Never fails; returns `Result` for symmetry with the other commands.
pub async fn notifications(state: &AppState) -> Result<(), AppError> {
    let entries = state.notifications().await;
    if entries.is_empty() {
        output::line("No notifications");
        return Ok(());
    }
    for entry in entries.iter().rev() {
        output::line(format_args!(
            "{}  {}",
            entry.created_at().format(LIST_DATE_FORMAT),
            entry.message()
        ));
    }
    Ok(())
}

/// List the service catalog.
///
/// # Errors
///
/// Returns an error if the built-in catalog fails to load.
pub fn categories() -> Result<(), AppError> {
    let catalog = Catalog::builtin()?;
    for category in catalog.categories() {
        output::line(format_args!("{}: {}", category.name, category.description));
        for subcategory in &category.subcategories {
            output::line(format_args!("  {}", category.label_for(subcategory)));
        }
    }
    Ok(())
}

/// Resolve user input to the catalog's spelling of the service label.
fn canonical_label(catalog: &Catalog, input: &str) -> Result<String, AppError> {
    let found = catalog.resolve_label(input).ok_or_else(|| {
        AppError::BadRequest(format!(
            "Unknown service `{}`; run `hs-cli categories` for the list",
            input.trim()
        ))
    })?;

    Ok(found.subcategory.map_or_else(
        || found.category.name.clone(),
        |sub| found.category.label_for(sub),
    ))
}

fn parse_date_time(input: &str) -> Result<DateTime<Utc>, AppError> {
    let input = input.trim();
    DateTime::parse_from_rfc3339(input)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(input, PLAIN_DATE_TIME_FORMAT).map(|dt| dt.and_utc())
        })
        .map_err(|_| {
            AppError::BadRequest(format!(
                "`{input}` is not a date and time; use RFC 3339 or \"YYYY-MM-DD HH:MM\""
            ))
        })
}

fn format_booking(state: &AppState, booking: &Booking) -> String {
    let status = state.status_of(booking).to_string();
    let mut line = format!(
        "{}  {status:<9}  {}  {} ({})",
        booking.id(),
        booking.scheduled_at().format(LIST_DATE_FORMAT),
        booking.service_name(),
        booking.province_name(),
    );
    if !booking.notes().is_empty() {
        line.push_str("\n    ");
        line.push_str(booking.notes());
    }
    line
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_parse_date_time_formats() {
        let expected = Utc.with_ymd_and_hms(2026, 5, 1, 10, 0, 0).unwrap();
        assert_eq!(parse_date_time("2026-05-01T10:00:00Z").unwrap(), expected);
        assert_eq!(parse_date_time("2026-05-01T12:00:00+02:00").unwrap(), expected);
        assert_eq!(parse_date_time(" 2026-05-01 10:00 ").unwrap(), expected);
        assert!(parse_date_time("tomorrow").is_err());
    }

    #[test]
    fn test_canonical_label_uses_catalog_spelling() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(
            canonical_label(&catalog, "plumbing - leak repair").unwrap(),
            "Plumbing - Leak Repair"
        );
        assert_eq!(canonical_label(&catalog, "PLUMBING").unwrap(), "Plumbing");
        assert!(canonical_label(&catalog, "Plumb").is_err());
    }
}
