//! Outbound mail seam.
//!
//! The notification router and the email draft approval both send through a
//! shared [`Mailer`] trait object, so tests can swap SMTP for a recorder.

use async_trait::async_trait;
use gardenkeep_events::{EmailDelivery, EmailError};

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send one plain-text mail.
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError>;
}

#[async_trait]
impl Mailer for EmailDelivery {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError> {
        EmailDelivery::send(self, to, subject, body).await
    }
}
