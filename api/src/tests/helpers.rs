//! Shared scaffolding for route-level tests: an app router over an
//! in-memory database, session cookies, and one-shot request helpers.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    routing::get,
};
use serde_json::Value;
use tower::ServiceExt;
use util::events::EventBroker;
use util::state::AppState;

use crate::auth::session::{self, SessionPayload};
use crate::events::sse::stream_events;
use crate::routes::routes;

pub async fn test_app() -> (Router, AppState) {
    let db = db::test_utils::setup_test_db().await;
    let state = AppState::new(db, EventBroker::new());
    let app = Router::new()
        .nest("/api", routes(state.clone()))
        .route("/events", get(stream_events))
        .with_state(state.clone());
    (app, state)
}

/// A valid `Cookie` header value for the given user id.
pub fn cookie_for(user_id: i64) -> String {
    let token = session::encode(
        &util::config::session_secret(),
        &SessionPayload::new(user_id),
    );
    format!("session={token}")
}

pub async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

pub async fn get_json(app: &Router, uri: &str, cookie: Option<&str>) -> (StatusCode, Value) {
    request(app, "GET", uri, cookie, None).await
}

pub async fn post_json(
    app: &Router,
    uri: &str,
    cookie: Option<&str>,
    body: Value,
) -> (StatusCode, Value) {
    request(app, "POST", uri, cookie, Some(body)).await
}
