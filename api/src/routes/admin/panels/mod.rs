use axum::{
    Router,
    routing::{delete, get, put},
};
use util::state::AppState;

pub mod common;
pub mod delete;
pub mod get;
pub mod post;
pub mod put;

use delete::delete_panel;
use get::list_panels;
use post::create_panel;
use put::update_panel;

/// Builds the `/admin/panels` route group.
pub fn panel_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_panels).post(create_panel))
        .route("/{panel_id}", put(update_panel))
        .route("/{panel_id}", delete(delete_panel))
}
