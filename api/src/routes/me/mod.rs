use axum::{Router, routing::get};
use util::state::AppState;

pub mod get;

use get::get_me;

/// Builds the `/me` route group. Requires authentication.
pub fn me_routes() -> Router<AppState> {
    Router::new().route("/", get(get_me))
}
