use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::models::{audit_log, panel_role_access, ticket_panel};
use db::permissions::Capability;
use util::state::AppState;

use crate::auth::claims::StaffContext;
use crate::auth::guards::{Empty, require_capability};
use crate::response::ApiResponse;
use crate::routes::common::db_error_response;

/// DELETE /api/admin/panels/{panel_id}
///
/// ### Errors
/// - `404 Not Found` — unknown panel
/// - `409 Conflict` — tickets still reference the panel
pub async fn delete_panel(
    State(state): State<AppState>,
    Extension(ctx): Extension<StaffContext>,
    Path(panel_id): Path<i64>,
) -> Response {
    if let Err(e) = require_capability(&ctx, Capability::ManagePanels) {
        return e.into_response();
    }

    let panel = match ticket_panel::Model::find_by_id(state.db(), panel_id).await {
        Ok(Some(panel)) => panel,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<Empty>::error("Panel not found")),
            )
                .into_response();
        }
        Err(e) => return db_error_response(e),
    };

    match ticket_panel::Model::is_referenced(state.db(), panel_id).await {
        Ok(true) => {
            return (
                StatusCode::CONFLICT,
                Json(ApiResponse::<Empty>::error(
                    "Panel still has tickets and cannot be deleted",
                )),
            )
                .into_response();
        }
        Ok(false) => {}
        Err(e) => return db_error_response(e),
    }

    // Drop the allow-list rows before the panel itself.
    if let Err(e) = panel_role_access::Model::set_for_panel(state.db(), panel_id, &[]).await {
        return db_error_response(e);
    }
    if let Err(e) = ticket_panel::Model::delete(state.db(), panel_id).await {
        return db_error_response(e);
    }

    audit_log::Model::record(
        state.db(),
        Some(ctx.staff.user_id),
        "panel.deleted",
        "panel",
        panel_id,
        Some(serde_json::json!({ "name": panel.name })),
    )
    .await;

    Json(ApiResponse::<()>::success((), "Panel deleted successfully")).into_response()
}
