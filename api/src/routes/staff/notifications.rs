//! The staff notification inbox: pay changes and similar, drained by the
//! staff client.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use db::models::staff_notification;
use serde::{Deserialize, Serialize};
use util::state::AppState;

use crate::auth::claims::StaffContext;
use crate::response::ApiResponse;
use crate::routes::common::{db_error_response, domain_error_response};

#[derive(Debug, Deserialize)]
pub struct InboxQuery {
    pub unread_only: Option<bool>,
}

#[derive(Serialize)]
pub struct NotificationResponse {
    pub id: i64,
    pub kind: String,
    pub message: String,
    pub metadata: Option<serde_json::Value>,
    pub read_at: Option<String>,
    pub created_at: String,
}

impl From<staff_notification::Model> for NotificationResponse {
    fn from(n: staff_notification::Model) -> Self {
        Self {
            id: n.id,
            kind: n.kind,
            message: n.message,
            metadata: n.metadata.and_then(|m| serde_json::from_str(&m).ok()),
            read_at: n.read_at.map(|t| t.to_rfc3339()),
            created_at: n.created_at.to_rfc3339(),
        }
    }
}

/// GET /api/staff/notifications
///
/// Lists the acting staff member's notifications, newest first. Pass
/// `?unread_only=true` to drain just the unread set.
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(ctx): Extension<StaffContext>,
    Query(query): Query<InboxQuery>,
) -> Response {
    match staff_notification::Model::list_for_staff(
        state.db(),
        ctx.staff.id,
        query.unread_only.unwrap_or(false),
    )
    .await
    {
        Ok(items) => {
            let views: Vec<NotificationResponse> =
                items.into_iter().map(NotificationResponse::from).collect();
            Json(ApiResponse::success(views, "Notifications retrieved successfully"))
                .into_response()
        }
        Err(e) => db_error_response(e),
    }
}

/// POST /api/staff/notifications/{notification_id}/read
///
/// Marks one of the member's own notifications as read. Idempotent.
pub async fn mark_notification_read(
    State(state): State<AppState>,
    Extension(ctx): Extension<StaffContext>,
    Path(notification_id): Path<i64>,
) -> Response {
    match staff_notification::Model::mark_read(state.db(), ctx.staff.id, notification_id).await {
        Ok(n) => Json(ApiResponse::success(
            NotificationResponse::from(n),
            "Notification marked as read",
        ))
        .into_response(),
        Err(e) => domain_error_response(e),
    }
}

/// POST /api/staff/notifications/read-all
pub async fn mark_all_notifications_read(
    State(state): State<AppState>,
    Extension(ctx): Extension<StaffContext>,
) -> Response {
    match staff_notification::Model::mark_all_read(state.db(), ctx.staff.id).await {
        Ok(()) => {
            Json(ApiResponse::<()>::success((), "All notifications marked as read")).into_response()
        }
        Err(e) => db_error_response(e),
    }
}
