//! Booking lifecycle, ownership and notifications.

#![allow(clippy::unwrap_used)]

use chrono::Duration;
use homeservice_app::models::{NewAccount, NewBooking};
use homeservice_app::services::filter_by_owner;
use homeservice_core::{BookingStatus, Catalog, Province};
use homeservice_integration_tests::{TestContext, test_now};

fn leak_repair(in_hours: i64) -> NewBooking {
    NewBooking::new(
        "Plumbing - Leak Repair",
        Province::Ontario,
        test_now() + Duration::hours(in_hours),
    )
}

// =============================================================================
// Ownership
// =============================================================================

#[tokio::test]
async fn test_owner_defaults_to_session_and_explicit_owner_wins() {
    let ctx = TestContext::new().await;
    ctx.state
        .register(NewAccount::new("Ada", "Ada@X.com", "", "pw"))
        .await;

    let implicit = ctx.state.add_booking(leak_repair(48)).await;
    let explicit = ctx
        .state
        .add_booking(leak_repair(48).with_owner("Bob@X.com"))
        .await;
    let blank = ctx.state.add_booking(leak_repair(48).with_owner("")).await;

    assert_eq!(implicit.owner_email().as_str(), "ada@x.com");
    assert_eq!(explicit.owner_email().as_str(), "bob@x.com");
    assert_eq!(blank.owner_email().as_str(), "ada@x.com");
}

#[tokio::test]
async fn test_signed_out_booking_has_no_owner() {
    let ctx = TestContext::new().await;
    let booking = ctx.state.add_booking(leak_repair(48)).await;
    assert!(booking.owner_email().is_empty());
}

#[tokio::test]
async fn test_filter_by_owner() {
    let ctx = TestContext::new().await;
    ctx.state
        .add_booking(leak_repair(1).with_owner("ada@x.com"))
        .await;
    ctx.state
        .add_booking(leak_repair(2).with_owner("bob@x.com"))
        .await;
    ctx.state
        .add_booking(leak_repair(3).with_owner("ADA@x.com"))
        .await;

    let all = ctx.state.bookings().await;
    assert_eq!(filter_by_owner(&all, None).len(), 3);
    assert_eq!(filter_by_owner(&all, Some("Ada@X.com")).len(), 2);
    assert!(filter_by_owner(&all, Some("nobody@x.com")).is_empty());

    // Signed out: every booking
    assert_eq!(ctx.state.bookings_for_current_user().await.len(), 3);
}

#[tokio::test]
async fn test_bookings_keep_creation_order() {
    let ctx = TestContext::new().await;
    let ids: Vec<_> = [
        ctx.state.add_booking(leak_repair(72)).await.id(),
        ctx.state.add_booking(leak_repair(1)).await.id(),
        ctx.state.add_booking(leak_repair(30)).await.id(),
    ]
    .into();

    let listed: Vec<_> = ctx.state.bookings().await.iter().map(|b| b.id()).collect();
    assert_eq!(listed, ids);
}

// =============================================================================
// Status & Cancellation
// =============================================================================

#[tokio::test]
async fn test_status_follows_the_clock() {
    let ctx = TestContext::new().await;
    let far = ctx.state.add_booking(leak_repair(48)).await;
    let soon = ctx.state.add_booking(leak_repair(12)).await;

    assert_eq!(ctx.state.status_of(&far), BookingStatus::Scheduled);
    assert_eq!(ctx.state.status_of(&soon), BookingStatus::Upcoming);

    ctx.clock.advance(Duration::hours(36));
    assert_eq!(ctx.state.status_of(&far), BookingStatus::Upcoming);
    assert_eq!(ctx.state.status_of(&soon), BookingStatus::Completed);
}

#[tokio::test]
async fn test_cancel_twice_records_two_notifications() {
    let ctx = TestContext::new().await;
    let booking = ctx.state.add_booking(leak_repair(48)).await;

    assert!(ctx.state.cancel_booking(&booking).await);
    assert!(ctx.state.cancel_booking(&booking).await);

    let stored = ctx.state.booking(booking.id()).await.unwrap();
    assert!(stored.is_cancelled());
    assert_eq!(ctx.state.status_of(&stored), BookingStatus::Cancelled);

    let messages: Vec<String> = ctx
        .state
        .notifications()
        .await
        .iter()
        .map(|n| n.message().to_owned())
        .collect();
    assert_eq!(messages.len(), 3);
    assert!(messages.first().unwrap().starts_with("Booking confirmed: "));
    assert_eq!(
        messages
            .iter()
            .filter(|m| m.starts_with("Booking cancelled: Plumbing - Leak Repair"))
            .count(),
        2
    );
}

#[tokio::test]
async fn test_cancel_unknown_booking_still_notifies() {
    let ctx = TestContext::new().await;
    let other = TestContext::new().await;
    let stray = other.state.add_booking(leak_repair(5)).await;

    assert!(!ctx.state.cancel_booking(&stray).await);
    assert!(ctx.state.bookings().await.is_empty());
    assert_eq!(ctx.state.notifications().await.len(), 1);
}

#[tokio::test]
async fn test_notifications_use_the_clock() {
    let ctx = TestContext::new().await;
    ctx.state.add_booking(leak_repair(48)).await;
    ctx.clock.advance(Duration::minutes(5));
    ctx.state.add_booking(leak_repair(48)).await;

    let stamps: Vec<_> = ctx
        .state
        .notifications()
        .await
        .iter()
        .map(homeservice_app::models::NotificationEntry::created_at)
        .collect();
    assert_eq!(stamps, [test_now(), test_now() + Duration::minutes(5)]);
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn test_booked_label_resolves_to_catalog_entry() {
    let ctx = TestContext::new().await;
    let catalog = Catalog::builtin().unwrap();
    let label = catalog.service_label("plumbing", "leak-repair").unwrap();

    let booking = ctx
        .state
        .add_booking(NewBooking::new(
            label,
            Province::BritishColumbia,
            test_now() + Duration::days(2),
        ))
        .await;

    let found = catalog.resolve_label(booking.service_name()).unwrap();
    assert_eq!(found.category.id, "plumbing");
    assert_eq!(found.subcategory.unwrap().name, "Leak Repair");
}
