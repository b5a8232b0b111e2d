use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::models::{audit_log, ticket_status};
use db::permissions::Capability;
use util::state::AppState;

use crate::auth::claims::StaffContext;
use crate::auth::guards::{Empty, require_capability};
use crate::response::ApiResponse;
use crate::routes::common::db_error_response;

/// DELETE /api/admin/statuses/{status_id}
///
/// ### Errors
/// - `404 Not Found` — unknown status
/// - `409 Conflict` — tickets still reference the status
pub async fn delete_status(
    State(state): State<AppState>,
    Extension(ctx): Extension<StaffContext>,
    Path(status_id): Path<i64>,
) -> Response {
    if let Err(e) = require_capability(&ctx, Capability::ManageStatuses) {
        return e.into_response();
    }

    let status = match ticket_status::Model::find_by_id(state.db(), status_id).await {
        Ok(Some(status)) => status,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<Empty>::error("Ticket status not found")),
            )
                .into_response();
        }
        Err(e) => return db_error_response(e),
    };

    match ticket_status::Model::is_referenced(state.db(), status_id).await {
        Ok(true) => {
            return (
                StatusCode::CONFLICT,
                Json(ApiResponse::<Empty>::error(
                    "Status still has tickets and cannot be deleted",
                )),
            )
                .into_response();
        }
        Ok(false) => {}
        Err(e) => return db_error_response(e),
    }

    if let Err(e) = ticket_status::Model::delete(state.db(), status_id).await {
        return db_error_response(e);
    }

    audit_log::Model::record(
        state.db(),
        Some(ctx.staff.user_id),
        "status.deleted",
        "status",
        status_id,
        Some(serde_json::json!({ "slug": status.slug })),
    )
    .await;

    Json(ApiResponse::<()>::success((), "Status deleted successfully")).into_response()
}
