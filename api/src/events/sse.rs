//! `GET /events` — the server-sent-events stream of ticket lifecycle
//! notifications.
//!
//! Each subscriber registers on the `EventBroker` with a visibility filter
//! resolved once at connect time: staff see every event, end users only
//! events for tickets they created. The subscription is an RAII guard owned
//! by the stream, so dropping the connection unregisters promptly. Frames
//! are `event: <type>\ndata: <json>\n\n`, with periodic keep-alive pings.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::sse::{Event, KeepAlive, Sse},
    response::{IntoResponse, Response},
};
use db::models::{staff_member, user};
use sea_orm::EntityTrait;
use util::events::EventFilter;
use util::state::AppState;

use crate::auth::extractors::payload_from_headers;
use crate::auth::guards::Empty;
use crate::response::ApiResponse;

/// GET /events
///
/// Opens a long-lived `text/event-stream`. Requires a valid session cookie.
///
/// ### Errors
/// - `401 Unauthorized` — no or invalid session
pub async fn stream_events(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let unauthorized = || {
        (
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::<Empty>::error("Authentication required")),
        )
            .into_response()
    };

    let Some(payload) = payload_from_headers(&headers) else {
        return unauthorized();
    };

    let user = match user::Entity::find_by_id(payload.sub).one(state.db()).await {
        Ok(Some(user)) => user,
        _ => return unauthorized(),
    };

    let is_staff = matches!(
        staff_member::Model::find_active_by_user_id(state.db(), user.id).await,
        Ok(Some(_))
    );

    let filter: EventFilter = if is_staff {
        Box::new(|_| true)
    } else {
        let user_id = user.id;
        Box::new(move |event| event.creator_user_id == user_id)
    };

    let (subscription, rx) = state.events().register(filter);
    tracing::debug!(subscriber = subscription.id(), user = user.id, "SSE subscriber connected");

    // The subscription guard rides along in the stream state; when the
    // client disconnects the stream is dropped and the guard unregisters.
    let stream = futures::stream::unfold((rx, subscription), |(mut rx, sub)| async move {
        let event = rx.recv().await?;
        let frame = Event::default()
            .event(event.kind.as_str())
            .data(serde_json::to_string(&event).unwrap_or_else(|_| "{}".into()));
        Some((Ok::<Event, Infallible>(frame), (rx, sub)))
    });

    Sse::new(stream)
        .keep_alive(
            KeepAlive::new()
                .interval(Duration::from_secs(15))
                .text("ping"),
        )
        .into_response()
}
