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

use delete::delete_role;
use get::list_roles;
use post::create_role;
use put::update_role;

/// Builds the `/admin/roles` route group. Role edits and deletions are
/// hierarchy-gated: a non-admin actor must strictly outrank the target, may
/// never touch the admin role, and may only grant permissions they hold.
pub fn role_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_roles).post(create_role))
        .route("/{role_id}", put(update_role))
        .route("/{role_id}", delete(delete_role))
}
