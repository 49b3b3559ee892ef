//! HTTP-level tests for the email draft approval queue.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{body_json, create_user, get_auth, post_json_auth, RecordingMailer};
use gardenkeep_core::roles::{ROLE_ADMIN, ROLE_USER};
use serde_json::json;
use sqlx::PgPool;

fn draft_body() -> serde_json::Value {
    json!({
        "to": "handwerker@example.com",
        "toName": "Herr Meier",
        "subject": "Zaun reparieren",
        "body": "Guten Tag, können Sie nächste Woche vorbeikommen?",
        "taskId": 7,
        "taskTitle": "Zaun reparieren",
    })
}

/// Queue one draft as a regular user and return its id.
async fn queue_draft(pool: &PgPool, token: &str) -> i64 {
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/v1/email-drafts", token, draft_body()).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn queued_draft_is_listed_as_pending(pool: PgPool) {
    let (_, admin_token) = create_user(&pool, "root", ROLE_ADMIN).await;
    let (_, token) = create_user(&pool, "assistant", ROLE_USER).await;
    let id = queue_draft(&pool, &token).await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/email-drafts", &admin_token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let drafts = json["data"].as_array().unwrap();
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0]["id"], id);
    assert_eq!(drafts[0]["status"], "pending");
    assert_eq!(drafts[0]["to_name"], "Herr Meier");
    assert_eq!(drafts[0]["created_by"], "assistant@garden.test");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn draft_without_subject_or_recipient_is_rejected(pool: PgPool) {
    let (_, token) = create_user(&pool, "assistant", ROLE_USER).await;

    let app = common::build_test_app(pool.clone());
    let mut no_subject = draft_body();
    no_subject["subject"] = json!("");
    let response = post_json_auth(app, "/api/v1/email-drafts", &token, no_subject).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool);
    let mut bad_recipient = draft_body();
    bad_recipient["to"] = json!("not-an-address");
    let response = post_json_auth(app, "/api/v1/email-drafts", &token, bad_recipient).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn only_admins_list_and_decide(pool: PgPool) {
    let (_, token) = create_user(&pool, "assistant", ROLE_USER).await;
    let id = queue_draft(&pool, &token).await;
    let mailer = Arc::new(RecordingMailer::default());

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/email-drafts", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app_with_mailer(pool, mailer.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/email-drafts/{id}/approve"),
        &token,
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(mailer.sent().is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn approval_sends_the_edited_body_once(pool: PgPool) {
    let (_, admin_token) = create_user(&pool, "root", ROLE_ADMIN).await;
    let (_, token) = create_user(&pool, "assistant", ROLE_USER).await;
    let id = queue_draft(&pool, &token).await;
    let mailer = Arc::new(RecordingMailer::default());

    let app = common::build_test_app_with_mailer(pool.clone(), mailer.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/email-drafts/{id}/approve"),
        &admin_token,
        json!({ "body": "Guten Tag Herr Meier, passt Dienstag?" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "sent");
    assert_eq!(json["data"]["final_body"], "Guten Tag Herr Meier, passt Dienstag?");
    assert_eq!(json["data"]["decided_by"], "root@garden.test");

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "handwerker@example.com");
    assert_eq!(sent[0].subject, "Zaun reparieren");
    assert_eq!(sent[0].body, "Guten Tag Herr Meier, passt Dienstag?");

    // A second approval must not send again.
    let app = common::build_test_app_with_mailer(pool, mailer.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/email-drafts/{id}/approve"),
        &admin_token,
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(mailer.sent().len(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn approval_without_edit_sends_the_drafted_body(pool: PgPool) {
    let (_, admin_token) = create_user(&pool, "root", ROLE_ADMIN).await;
    let id = queue_draft(&pool, &admin_token).await;
    let mailer = Arc::new(RecordingMailer::default());

    let app = common::build_test_app_with_mailer(pool, mailer.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/email-drafts/{id}/approve"),
        &admin_token,
        json!({}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        mailer.sent()[0].body,
        "Guten Tag, können Sie nächste Woche vorbeikommen?"
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn rejected_draft_cannot_be_approved(pool: PgPool) {
    let (_, admin_token) = create_user(&pool, "root", ROLE_ADMIN).await;
    let id = queue_draft(&pool, &admin_token).await;
    let mailer = Arc::new(RecordingMailer::default());

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/email-drafts/{id}/reject"),
        &admin_token,
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "rejected");

    let app = common::build_test_app_with_mailer(pool.clone(), mailer.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/email-drafts/{id}/approve"),
        &admin_token,
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(mailer.sent().is_empty());

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/email-drafts?status=rejected", &admin_token).await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn failed_delivery_leaves_the_draft_pending(pool: PgPool) {
    let (_, admin_token) = create_user(&pool, "root", ROLE_ADMIN).await;
    let id = queue_draft(&pool, &admin_token).await;

    let app = common::build_test_app_with_mailer(pool.clone(), Arc::new(RecordingMailer::failing()));
    let response = post_json_auth(
        app,
        &format!("/api/v1/email-drafts/{id}/approve"),
        &admin_token,
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    // Retrying with a working relay succeeds.
    let mailer = Arc::new(RecordingMailer::default());
    let app = common::build_test_app_with_mailer(pool, mailer.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/email-drafts/{id}/approve"),
        &admin_token,
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(mailer.sent().len(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn approval_without_mailer_is_unavailable(pool: PgPool) {
    let (_, admin_token) = create_user(&pool, "root", ROLE_ADMIN).await;
    let id = queue_draft(&pool, &admin_token).await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/email-drafts/{id}/approve"),
        &admin_token,
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/email-drafts", &admin_token).await;
    assert_eq!(body_json(response).await["data"][0]["status"], "pending");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_draft_is_not_found(pool: PgPool) {
    let (_, admin_token) = create_user(&pool, "root", ROLE_ADMIN).await;

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/email-drafts/9999/reject",
        &admin_token,
        json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
