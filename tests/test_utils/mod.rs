//! Test utilities for integration tests
#![allow(dead_code)]

use std::sync::{Arc, RwLock};

use axum::{Router, body::Body};
use http::Request;
use serde_json::Value;
use tokio::sync::mpsc::UnboundedReceiver;

use huddle::api::AppState;
use huddle::api::app;
use huddle::core::AppConfig;
use huddle::core::db::memory_db;
use huddle::events::UserId;
use huddle::notify::{Notification, Outbox};
use huddle::users::{SqliteUserDirectory, User, UserDirectory};

/// Users present in the directory of every test app.
pub const USERS: &[(&str, &str, &str)] = &[
    ("owner", "Ada", "ada@example.com"),
    ("alice", "Alice", "alice@example.com"),
    ("bob", "Bob", "bob@example.com"),
];

/// Creates a test application backed by an in-memory database along
/// with the receiving end of its notification outbox.
pub async fn test_app_with_outbox() -> (Router, UnboundedReceiver<Notification>) {
    let db = memory_db().await.expect("Failed to open in-memory db");

    let directory = SqliteUserDirectory::new(db.clone());
    for (id, first_name, email) in USERS {
        directory
            .insert_user(&User {
                id: UserId::from(*id),
                first_name: first_name.to_string(),
                last_name: String::from("Test"),
                email: email.to_string(),
            })
            .await
            .expect("Failed to seed user");
    }

    let app_config = AppConfig {
        storage_path: String::from("unused"),
        db_path: String::from("unused"),
        base_url: String::from("http://localhost:8080"),
        mail_api_url: None,
        chat_webhook_url: None,
        reminder_offsets_hours: vec![0, 24, 72],
        write_attempts: 3,
        ..AppConfig::default()
    };
    let (outbox, rx) = Outbox::channel();
    let app_state = AppState::new(db, &app_config, outbox);
    (app(Arc::new(RwLock::new(app_state))), rx)
}

/// Creates a test application. Notifications are drained and
/// discarded.
pub async fn test_app() -> Router {
    let (app, mut rx) = test_app_with_outbox().await;
    tokio::spawn(async move { while rx.recv().await.is_some() {} });
    app
}

/// Build a JSON request, optionally signed in as `user`.
pub fn json_request(method: &str, uri: &str, user: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    let body = match body {
        Some(value) => Body::from(value.to_string()),
        None => Body::empty(),
    };
    builder.body(body).unwrap()
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_to_json(body: Body) -> Value {
    serde_json::from_str(&body_to_string(body).await).unwrap()
}

pub fn drain(rx: &mut UnboundedReceiver<Notification>) -> Vec<Notification> {
    let mut sent = Vec::new();
    while let Ok(notification) = rx.try_recv() {
        sent.push(notification);
    }
    sent
}
