use axum::{
    Router,
    routing::{delete, get, put},
};
use util::state::AppState;

pub mod delete;
pub mod get;
pub mod post;
pub mod put;

use delete::delete_status;
use get::list_statuses;
use post::create_status;
use put::update_status;

/// Builds the `/admin/statuses` route group.
pub fn status_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_statuses).post(create_status))
        .route("/{status_id}", put(update_status))
        .route("/{status_id}", delete(delete_status))
}
