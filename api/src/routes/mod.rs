//! HTTP route entry point for `/api/...`.
//!
//! Routes are organized by domain, each protected via the appropriate
//! access-control middleware:
//! - `/health` → health check (public)
//! - `/auth` → session establishment and teardown (public)
//! - `/me` → the authenticated user's own profile
//! - `/tickets` → end-user ticket surface (authenticated)
//! - `/staff` → triage queue, lifecycle operations, inbox, pay (staff)
//! - `/admin` → panel/status/role/staff configuration and the audit view
//!   (staff; per-handler capability and hierarchy checks)

use axum::{Router, middleware::from_fn_with_state};
use util::state::AppState;

use crate::auth::guards::{allow_authenticated, allow_staff};

pub mod admin;
pub mod auth;
pub mod common;
pub mod health;
pub mod me;
pub mod staff;
pub mod tickets;

/// Builds the complete application router for all `/api` endpoints.
///
/// The `/admin` group deliberately sits behind `allow_staff` rather than
/// `allow_admin`: the hierarchy rule lets senior non-admin staff manage
/// roles and staff below their own rank, so admin standing is decided
/// per-operation, not per-route-group.
pub fn routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/health", health::health_routes())
        .nest("/auth", auth::auth_routes())
        .nest(
            "/me",
            me::me_routes().route_layer(from_fn_with_state(app_state.clone(), allow_authenticated)),
        )
        .nest(
            "/tickets",
            tickets::ticket_routes()
                .route_layer(from_fn_with_state(app_state.clone(), allow_authenticated)),
        )
        .nest(
            "/staff",
            staff::staff_routes().route_layer(from_fn_with_state(app_state.clone(), allow_staff)),
        )
        .nest(
            "/admin",
            admin::admin_routes().route_layer(from_fn_with_state(app_state.clone(), allow_staff)),
        )
}
