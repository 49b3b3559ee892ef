#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Method, Request, Response};
use async_trait::async_trait;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use gardenkeep_api::auth::jwt::{generate_access_token, JwtConfig};
use gardenkeep_api::auth::password::hash_password;
use gardenkeep_api::config::{PricingConfig, ServerConfig};
use gardenkeep_api::mailer::Mailer;
use gardenkeep_api::router::build_app_router;
use gardenkeep_api::state::AppState;
use gardenkeep_api::storage::LocalMediaStore;
use gardenkeep_db::models::user::{CreateUser, User};
use gardenkeep_db::repositories::UserRepo;
use gardenkeep_events::{EmailError, EventBus};

pub const TEST_PASSWORD: &str = "garden_password_123";

/// Build a test `ServerConfig` with safe defaults and a fresh media directory.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        media_dir: std::env::temp_dir().join(format!("gardenkeep-test-{}", uuid::Uuid::new_v4())),
        admin_email: None,
        jwt: JwtConfig {
            secret: "test-secret-for-integration-tests".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
        pricing: PricingConfig::default(),
    }
}

/// Build the full application router, with the production middleware stack,
/// over the given pool. No mailer is configured.
pub fn build_test_app(pool: PgPool) -> Router {
    build_app(pool, None)
}

/// Like [`build_test_app`], but outbound mail goes to `mailer`.
pub fn build_test_app_with_mailer(pool: PgPool, mailer: Arc<dyn Mailer>) -> Router {
    build_app(pool, Some(mailer))
}

fn build_app(pool: PgPool, mailer: Option<Arc<dyn Mailer>>) -> Router {
    let config = test_config();
    std::fs::create_dir_all(&config.media_dir).unwrap();

    let state = AppState {
        pool,
        media_store: Arc::new(LocalMediaStore::new(config.media_dir.clone())),
        config: Arc::new(config.clone()),
        event_bus: Arc::new(EventBus::default()),
        mailer,
    };

    build_app_router(state, &config)
}

/// Insert an active user with [`TEST_PASSWORD`] and mint an access token.
pub async fn create_user(pool: &PgPool, username: &str, role: &str) -> (User, String) {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            email: format!("{username}@garden.test"),
            username: username.to_string(),
            name: None,
            password_hash: hash_password(TEST_PASSWORD).unwrap(),
            role: role.to_string(),
        },
    )
    .await
    .unwrap();

    let token =
        generate_access_token(user.id, &user.email, &user.role, &test_config().jwt).unwrap();
    (user, token)
}

// ---------------------------------------------------------------------------
// Mail
// ---------------------------------------------------------------------------

/// A mail captured by [`RecordingMailer`].
#[derive(Debug, Clone, PartialEq)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Records every mail instead of sending it; `failing()` rejects them all.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError> {
        if self.fail {
            return Err(EmailError::Build("relay refused the message".into()));
        }
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn patch_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// POST a multipart form with text fields and one file part.
pub async fn post_multipart_auth(
    app: Router,
    uri: &str,
    token: &str,
    fields: &[(&str, &str)],
    file: (&str, &str, &str, &[u8]),
) -> Response<Body> {
    let boundary = "gardenkeep-test-boundary";
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    let (field, filename, content_type, data) = file;
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
