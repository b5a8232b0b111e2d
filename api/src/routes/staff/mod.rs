use axum::{
    Router,
    routing::{get, post},
};
use util::state::AppState;

pub mod notifications;
pub mod pay;
pub mod tickets;

use notifications::{list_notifications, mark_all_notifications_read, mark_notification_read};
use pay::{get_leaderboard, get_my_pay};

/// Builds the `/staff` route group: the triage queue, the notification
/// inbox and the pay views. The whole group sits behind `allow_staff`;
/// ticket operations add per-capability checks on top.
pub fn staff_routes() -> Router<AppState> {
    Router::new()
        .nest("/tickets", tickets::staff_ticket_routes())
        .route("/notifications", get(list_notifications))
        .route("/notifications/read-all", post(mark_all_notifications_read))
        .route(
            "/notifications/{notification_id}/read",
            post(mark_notification_read),
        )
        .route("/pay", get(get_my_pay))
        .route("/leaderboard", get(get_leaderboard))
}
