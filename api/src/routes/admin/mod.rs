use axum::{Router, routing::get};
use util::state::AppState;

pub mod audit;
pub mod panels;
pub mod roles;
pub mod staff;
pub mod statuses;

/// Builds the `/admin` route group: panel, status, role and staff
/// configuration plus the audit-trail view.
///
/// The group sits behind `allow_staff`, not `allow_admin`: non-admin staff
/// may manage anything their rank and capabilities permit. Every handler
/// enforces its own capability and, where a role or staff member is the
/// target, the hierarchy rule.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .nest("/panels", panels::panel_routes())
        .nest("/statuses", statuses::status_routes())
        .nest("/roles", roles::role_routes())
        .nest("/staff", staff::staff_admin_routes())
        .route("/audit", get(audit::list_audit))
}
