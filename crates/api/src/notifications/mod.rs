//! Event-driven email notifications.

pub mod router;

pub use router::NotificationRouter;
