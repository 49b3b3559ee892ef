//! Dot-separated names of the events published by the API.

/// A guest submitted a booking request. Payload carries the guest address,
/// dates and total.
pub const BOOKING_REQUESTED: &str = "booking.requested";

/// An admin confirmed or cancelled a booking.
pub const BOOKING_STATUS_CHANGED: &str = "booking.status_changed";

/// A project moved to `done` and awaits confirmation.
pub const PROJECT_COMPLETED: &str = "project.completed";

/// An admin confirmed a completed project and credit was booked.
pub const PROJECT_CONFIRMED: &str = "project.confirmed";

/// A recurring chore was completed.
pub const RECURRING_TASK_COMPLETED: &str = "recurring_task.completed";

/// A user reported a defect.
pub const ISSUE_REPORTED: &str = "issue.reported";

/// An admin approved or rejected a defect report.
pub const ISSUE_DECIDED: &str = "issue.decided";

/// A mail draft was queued for admin approval. Payload carries the
/// recipient address and subject.
pub const EMAIL_DRAFT_QUEUED: &str = "email_draft.queued";

/// An admin sent or rejected a mail draft.
pub const EMAIL_DRAFT_DECIDED: &str = "email_draft.decided";
