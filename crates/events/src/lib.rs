//! Gardenkeep event bus and notification delivery.
//!
//! - [`EventBus`] is the in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`] is the domain event envelope.
//! - [`event_types`] names every event the API publishes.
//! - [`delivery`] holds the external delivery channels (SMTP email).

pub mod bus;
pub mod delivery;
pub mod event_types;

pub use bus::{EventBus, PlatformEvent};
pub use delivery::email::{EmailConfig, EmailDelivery, EmailError};
