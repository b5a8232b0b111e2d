use axum::{
    Router,
    routing::{get, post},
};
use util::state::AppState;

pub mod common;
pub mod get;
pub mod post;

use get::{download_attachment, get_my_ticket, list_my_tickets};
use post::{create_ticket, post_message};

/// Builds the end-user `/tickets` route group. Requires authentication; a
/// user only ever sees tickets they created.
pub fn ticket_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_my_tickets).post(create_ticket))
        .route("/{public_id}", get(get_my_ticket))
        .route("/{public_id}/messages", post(post_message))
        .route(
            "/{public_id}/attachments/{attachment_id}",
            get(download_attachment),
        )
}
