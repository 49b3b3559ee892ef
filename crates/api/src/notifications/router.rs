//! Event-to-email routing.
//!
//! [`NotificationRouter`] subscribes to the platform event bus and turns
//! each event into zero or more mails: guests hear about their bookings,
//! the admin hears about new requests, completions, reports and queued mail
//! drafts, and reporters and completers hear about decisions. Delivery
//! failures are logged and never reach the request that published the event.

use std::sync::Arc;

use gardenkeep_events::event_types::{
    BOOKING_REQUESTED, BOOKING_STATUS_CHANGED, EMAIL_DRAFT_QUEUED, ISSUE_DECIDED, ISSUE_REPORTED,
    PROJECT_COMPLETED, PROJECT_CONFIRMED,
};
use gardenkeep_events::PlatformEvent;
use tokio::sync::broadcast;

use crate::mailer::Mailer;

/// One mail derived from an event.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl OutgoingMail {
    fn new(to: &str, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.to_string(),
            subject: subject.into(),
            body: body.into(),
        }
    }
}

/// Routes platform events to email recipients.
pub struct NotificationRouter {
    email: Option<Arc<dyn Mailer>>,
    admin_email: Option<String>,
}

impl NotificationRouter {
    /// `email` is `None` when SMTP is not configured; mails are then only logged.
    pub fn new(email: Option<Arc<dyn Mailer>>, admin_email: Option<String>) -> Self {
        Self { email, admin_email }
    }

    /// Run the routing loop until the event bus is dropped.
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.route_event(&event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification router shutting down");
                    break;
                }
            }
        }
    }

    async fn route_event(&self, event: &PlatformEvent) {
        let mails = compose(event, self.admin_email.as_deref());
        if mails.is_empty() {
            tracing::debug!(event_type = %event.event_type, "No recipients for event");
            return;
        }

        let Some(email) = &self.email else {
            for mail in &mails {
                tracing::info!(
                    to = %mail.to,
                    subject = %mail.subject,
                    "SMTP not configured, skipping email"
                );
            }
            return;
        };

        for mail in mails {
            if let Err(e) = email.send(&mail.to, &mail.subject, &mail.body).await {
                tracing::warn!(
                    error = %e,
                    to = %mail.to,
                    event_type = %event.event_type,
                    "Failed to send notification email"
                );
            }
        }
    }
}

/// Decide who is mailed about `event`, and with what.
///
/// Admin mails are dropped when no admin address is configured. Events
/// missing the payload field that names their recipient produce no mail.
pub fn compose(event: &PlatformEvent, admin_email: Option<&str>) -> Vec<OutgoingMail> {
    let field = |key: &str| event.payload_str(key).unwrap_or("");
    let mut mails = Vec::new();

    match event.event_type.as_str() {
        BOOKING_REQUESTED => {
            let dates = format!("{} - {}", field("check_in"), field("check_out"));
            let total = event
                .payload
                .get("total")
                .and_then(serde_json::Value::as_f64)
                .unwrap_or(0.0);
            if let Some(guest) = event.payload_str("guest_email") {
                mails.push(OutgoingMail::new(
                    guest,
                    "Booking request received",
                    format!(
                        "Hello {},\n\nwe received your booking request for {dates}.\n\
                         Total: {total:.2} EUR\n\nWe will get back to you shortly.",
                        field("guest_name")
                    ),
                ));
            }
            if let Some(admin) = admin_email {
                mails.push(OutgoingMail::new(
                    admin,
                    "New booking request",
                    format!(
                        "{} <{}> requested {dates}.\nTotal: {total:.2} EUR",
                        field("guest_name"),
                        field("guest_email")
                    ),
                ));
            }
        }
        BOOKING_STATUS_CHANGED => {
            if let Some(guest) = event.payload_str("guest_email") {
                mails.push(OutgoingMail::new(
                    guest,
                    format!("Booking {}", field("status")),
                    format!(
                        "Your booking for {} - {} is now {}.",
                        field("check_in"),
                        field("check_out"),
                        field("status")
                    ),
                ));
            }
        }
        PROJECT_COMPLETED => {
            if let Some(admin) = admin_email {
                mails.push(OutgoingMail::new(
                    admin,
                    "Completion awaiting confirmation",
                    format!(
                        "{} marked \"{}\" as done.",
                        field("completed_by"),
                        field("title")
                    ),
                ));
            }
        }
        PROJECT_CONFIRMED => {
            if let Some(completer) = event.payload_str("completed_by") {
                let credit = event
                    .payload
                    .get("credit_amount")
                    .and_then(serde_json::Value::as_f64)
                    .unwrap_or(0.0);
                mails.push(OutgoingMail::new(
                    completer,
                    "Completion confirmed",
                    format!(
                        "\"{}\" was confirmed. Credit awarded: {credit:.2}",
                        field("title")
                    ),
                ));
            }
        }
        ISSUE_REPORTED => {
            if let Some(admin) = admin_email {
                mails.push(OutgoingMail::new(
                    admin,
                    "New issue reported",
                    format!(
                        "{} reported \"{}\" ({}).",
                        field("reporter_email"),
                        field("title"),
                        field("category")
                    ),
                ));
            }
        }
        EMAIL_DRAFT_QUEUED => {
            if let Some(admin) = admin_email {
                mails.push(OutgoingMail::new(
                    admin,
                    "Email draft awaiting approval",
                    format!(
                        "A mail to {} (\"{}\") is waiting for your approval.",
                        field("to_email"),
                        field("subject")
                    ),
                ));
            }
        }
        ISSUE_DECIDED => {
            if let Some(reporter) = event.payload_str("reporter_email") {
                mails.push(OutgoingMail::new(
                    reporter,
                    format!("Issue {}", field("status")),
                    format!("Your report \"{}\" was {}.", field("title"), field("status")),
                ));
            }
        }
        _ => {}
    }

    mails
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn booking_requested() -> PlatformEvent {
        PlatformEvent::new(BOOKING_REQUESTED).with_payload(json!({
            "guest_name": "Clara",
            "guest_email": "clara@example.com",
            "check_in": "2026-02-10",
            "check_out": "2026-02-17",
            "total": 315.0,
        }))
    }

    #[test]
    fn booking_request_mails_guest_and_admin() {
        let mails = compose(&booking_requested(), Some("admin@example.com"));
        assert_eq!(mails.len(), 2);
        assert_eq!(mails[0].to, "clara@example.com");
        assert!(mails[0].body.contains("315.00"));
        assert_eq!(mails[1].to, "admin@example.com");
        assert!(mails[1].body.contains("2026-02-10 - 2026-02-17"));
    }

    #[test]
    fn admin_mails_are_dropped_without_admin_address() {
        let mails = compose(&booking_requested(), None);
        assert_eq!(mails.len(), 1);
        assert_eq!(mails[0].to, "clara@example.com");

        let completed = PlatformEvent::new(PROJECT_COMPLETED)
            .with_payload(json!({"title": "Mow lawn", "completed_by": "a@example.com"}));
        assert!(compose(&completed, None).is_empty());
    }

    #[test]
    fn confirmation_mails_the_completer() {
        let event = PlatformEvent::new(PROJECT_CONFIRMED).with_payload(json!({
            "title": "Mow lawn",
            "completed_by": "anna@example.com",
            "credit_amount": 15.0,
        }));
        let mails = compose(&event, Some("admin@example.com"));
        assert_eq!(mails.len(), 1);
        assert_eq!(mails[0].to, "anna@example.com");
        assert!(mails[0].body.contains("15.00"));
    }

    #[test]
    fn issue_decision_mails_the_reporter() {
        let event = PlatformEvent::new(ISSUE_DECIDED).with_payload(json!({
            "title": "Leaking tap",
            "reporter_email": "ben@example.com",
            "status": "approved",
        }));
        let mails = compose(&event, None);
        assert_eq!(mails.len(), 1);
        assert_eq!(mails[0].subject, "Issue approved");
    }

    #[test]
    fn queued_draft_mails_only_the_admin() {
        let event = PlatformEvent::new(EMAIL_DRAFT_QUEUED).with_payload(json!({
            "to_email": "handwerker@example.com",
            "subject": "Zaun",
        }));
        let mails = compose(&event, Some("admin@example.com"));
        assert_eq!(mails.len(), 1);
        assert_eq!(mails[0].to, "admin@example.com");
        assert!(mails[0].body.contains("handwerker@example.com"));
        assert!(compose(&event, None).is_empty());
    }

    #[test]
    fn unknown_events_and_missing_recipients_produce_nothing() {
        assert!(compose(&PlatformEvent::new("recurring_task.completed"), Some("a@b.c")).is_empty());
        let no_guest = PlatformEvent::new(BOOKING_STATUS_CHANGED).with_payload(json!({}));
        assert!(compose(&no_guest, Some("a@b.c")).is_empty());
    }
}
