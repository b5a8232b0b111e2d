use axum::{
    Router,
    routing::{get, post, put},
};
use util::state::AppState;

pub mod common;
pub mod get;
pub mod post;
pub mod put;

use get::list_staff;
use post::{create_staff, pay_bonus, pay_dock};
use put::update_staff;

/// Builds the `/admin/staff` route group. Staff management (role
/// assignment, suspension, pay) is hierarchy-gated against the target's
/// role.
pub fn staff_admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_staff).post(create_staff))
        .route("/{staff_id}", put(update_staff))
        .route("/{staff_id}/pay/bonus", post(pay_bonus))
        .route("/{staff_id}/pay/dock", post(pay_dock))
}
