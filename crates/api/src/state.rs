use std::sync::Arc;

use crate::config::ServerConfig;
use crate::mailer::Mailer;
use crate::storage::MediaStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind `Arc` or already `Clone`.
#[derive(Clone)]
pub struct AppState {
    pub pool: gardenkeep_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Publishes domain events to the notification router.
    pub event_bus: Arc<gardenkeep_events::EventBus>,
    /// Where uploaded photos and gallery media are written.
    pub media_store: Arc<dyn MediaStore>,
    /// Outbound mail; `None` when SMTP is not configured.
    pub mailer: Option<Arc<dyn Mailer>>,
}
