use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gardenkeep_api::background::session_cleanup;
use gardenkeep_api::config::ServerConfig;
use gardenkeep_api::mailer::Mailer;
use gardenkeep_api::notifications::NotificationRouter;
use gardenkeep_api::router::build_app_router;
use gardenkeep_api::state::AppState;
use gardenkeep_api::storage::LocalMediaStore;
use gardenkeep_events::{EmailConfig, EmailDelivery, EventBus};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gardenkeep_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = gardenkeep_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    gardenkeep_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    gardenkeep_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Media storage ---
    std::fs::create_dir_all(&config.media_dir).expect("Failed to create media directory");
    let media_store = Arc::new(LocalMediaStore::new(config.media_dir.clone()));
    tracing::info!(media_dir = %config.media_dir.display(), "Media storage ready");

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());

    let mailer: Option<Arc<dyn Mailer>> = EmailConfig::from_env()
        .map(|email| Arc::new(EmailDelivery::new(email)) as Arc<dyn Mailer>);
    if mailer.is_none() {
        tracing::info!("SMTP_HOST not set, email notifications and draft sending disabled");
    }
    let notification_router = NotificationRouter::new(mailer.clone(), config.admin_email.clone());
    let router_handle = tokio::spawn(notification_router.run(event_bus.subscribe()));

    // --- Background jobs ---
    let cleanup_cancel = CancellationToken::new();
    let cleanup_handle = tokio::spawn(session_cleanup::run(pool.clone(), cleanup_cancel.clone()));

    tracing::info!("Event services started (notification router, session cleanup)");

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
        media_store,
        mailer,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");
    let drain = Duration::from_secs(config.shutdown_timeout_secs);

    cleanup_cancel.cancel();
    let _ = tokio::time::timeout(drain, cleanup_handle).await;

    // Dropping the last sender closes the channel and ends the router loop.
    drop(event_bus);
    let _ = tokio::time::timeout(drain, router_handle).await;
    tracing::info!("Event services shut down");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
