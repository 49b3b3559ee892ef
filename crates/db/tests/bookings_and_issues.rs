//! Integration tests for bookings, issue triage and the admin dashboard.

use chrono::NaiveDate;
use gardenkeep_core::booking::BookingStatus;
use gardenkeep_core::project_workflow::Priority;
use gardenkeep_db::models::booking::CreateBooking;
use gardenkeep_db::models::issue::CreateIssue;
use gardenkeep_db::repositories::{BookingRepo, DashboardRepo, IssueRepo, ProjectRepo};
use sqlx::PgPool;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn new_booking(check_in: NaiveDate, check_out: NaiveDate) -> CreateBooking {
    CreateBooking {
        guest_name: "Guest".to_string(),
        guest_email: "Guest@Example.com".to_string(),
        guest_phone: None,
        check_in,
        check_out,
        guests: 2,
        has_pets: false,
        total_price: 31_500,
        discount_code: None,
        notes: None,
    }
}

fn new_issue(title: &str) -> CreateIssue {
    CreateIssue {
        title: title.to_string(),
        description: Some("Dripping since Monday".to_string()),
        category: "wasser".to_string(),
        photo_url: None,
        reported_by: None,
        reporter_email: "reporter@example.com".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Bookings
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_booking_is_pending_with_lowercased_email(pool: PgPool) {
    let booking = BookingRepo::create_if_available(&pool, &new_booking(date(2026, 2, 10), date(2026, 2, 17)))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(booking.status, "pending");
    assert_eq!(booking.guest_email, "guest@example.com");
    assert_eq!(booking.total_price, 31_500);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_overlapping_booking_is_refused(pool: PgPool) {
    BookingRepo::create_if_available(&pool, &new_booking(date(2026, 5, 1), date(2026, 5, 5)))
        .await
        .unwrap()
        .unwrap();

    let overlapping =
        BookingRepo::create_if_available(&pool, &new_booking(date(2026, 5, 4), date(2026, 5, 8)))
            .await
            .unwrap();
    assert!(overlapping.is_none());

    let adjacent =
        BookingRepo::create_if_available(&pool, &new_booking(date(2026, 5, 5), date(2026, 5, 8)))
            .await
            .unwrap();
    assert!(adjacent.is_some(), "a stay starting on another's check-out day is free");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_cancelled_booking_frees_dates(pool: PgPool) {
    let booking = BookingRepo::create_if_available(&pool, &new_booking(date(2026, 6, 1), date(2026, 6, 3)))
        .await
        .unwrap()
        .unwrap();
    BookingRepo::decide(&pool, booking.id, BookingStatus::Cancelled)
        .await
        .unwrap()
        .unwrap();

    let ranges = BookingRepo::occupied_ranges(&pool, None, None).await.unwrap();
    assert!(ranges.is_empty());
    let rebooked = BookingRepo::create_if_available(&pool, &new_booking(date(2026, 6, 1), date(2026, 6, 3)))
        .await
        .unwrap();
    assert!(rebooked.is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_decision_only_from_pending(pool: PgPool) {
    let booking = BookingRepo::create_if_available(&pool, &new_booking(date(2026, 7, 1), date(2026, 7, 4)))
        .await
        .unwrap()
        .unwrap();
    let confirmed = BookingRepo::decide(&pool, booking.id, BookingStatus::Confirmed)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(confirmed.status, "confirmed");

    let again = BookingRepo::decide(&pool, booking.id, BookingStatus::Cancelled).await.unwrap();
    assert!(again.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_occupied_ranges_window(pool: PgPool) {
    BookingRepo::create_if_available(&pool, &new_booking(date(2026, 3, 1), date(2026, 3, 4)))
        .await
        .unwrap()
        .unwrap();
    BookingRepo::create_if_available(&pool, &new_booking(date(2026, 8, 1), date(2026, 8, 4)))
        .await
        .unwrap()
        .unwrap();

    let march = BookingRepo::occupied_ranges(&pool, Some(date(2026, 3, 1)), Some(date(2026, 4, 1)))
        .await
        .unwrap();
    assert_eq!(march.len(), 1);
    assert_eq!(march[0].check_in, date(2026, 3, 1));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_checkout_before_checkin_is_rejected_by_schema(pool: PgPool) {
    let result =
        BookingRepo::create_if_available(&pool, &new_booking(date(2026, 9, 5), date(2026, 9, 5))).await;
    assert!(result.is_err());
}

// ---------------------------------------------------------------------------
// Issues
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_approve_creates_linked_project(pool: PgPool) {
    let issue = IssueRepo::create(&pool, &new_issue("Leaking tap")).await.unwrap();
    assert_eq!(issue.status, "pending");

    let (approved, project) = IssueRepo::approve(
        &pool,
        issue.id,
        Some(Priority::High),
        Some("fix before summer"),
        "admin@example.com",
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(approved.status, "approved");
    assert_eq!(approved.converted_to_project_id, Some(project.id));
    assert_eq!(approved.admin_notes.as_deref(), Some("fix before summer"));
    assert_eq!(project.title, "Leaking tap");
    assert_eq!(project.category, "wasser");
    assert_eq!(project.priority, "high");
    assert_eq!(project.status, "open");
    assert!(ProjectRepo::find_by_id(&pool, project.id).await.unwrap().is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_decisions_are_terminal(pool: PgPool) {
    let issue = IssueRepo::create(&pool, &new_issue("Broken gate")).await.unwrap();
    let rejected = IssueRepo::reject(&pool, issue.id, Some("duplicate")).await.unwrap().unwrap();
    assert_eq!(rejected.status, "rejected");
    assert!(rejected.converted_to_project_id.is_none());

    let approve = IssueRepo::approve(&pool, issue.id, None, None, "admin@example.com")
        .await
        .unwrap();
    assert!(approve.is_none());
    let reject = IssueRepo::reject(&pool, issue.id, None).await.unwrap();
    assert!(reject.is_none());

    let projects = ProjectRepo::list(&pool, None).await.unwrap();
    assert!(projects.is_empty(), "a refused approval must not leave a project behind");
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_dashboard_stats(pool: PgPool) {
    BookingRepo::create_if_available(&pool, &new_booking(date(2026, 10, 1), date(2026, 10, 3)))
        .await
        .unwrap()
        .unwrap();
    IssueRepo::approve(
        &pool,
        IssueRepo::create(&pool, &new_issue("Fuse box")).await.unwrap().id,
        None,
        None,
        "admin@example.com",
    )
    .await
    .unwrap()
    .unwrap();

    let stats = DashboardRepo::stats(&pool).await.unwrap();
    assert_eq!(stats.pending_bookings, 1);
    assert_eq!(stats.unconfirmed_completions, 0);
    assert_eq!(stats.total_credits_awarded, 0);
    assert_eq!(stats.projects_by_status.len(), 1);
    assert_eq!(stats.projects_by_status[0].status, "open");
    assert_eq!(stats.projects_by_status[0].count, 1);
}
