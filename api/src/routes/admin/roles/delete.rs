use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::models::{audit_log, role};
use db::permissions::{Capability, ensure_can_act_on_role};
use util::state::AppState;

use crate::auth::claims::StaffContext;
use crate::auth::guards::{Empty, require_capability};
use crate::response::ApiResponse;
use crate::routes::common::{db_error_response, domain_error_response};

/// DELETE /api/admin/roles/{role_id}
///
/// Deletes a role the actor outranks. The admin role can never be deleted
/// by a non-admin.
///
/// ### Errors
/// - `403 Forbidden` — hierarchy violation or admin-role target
/// - `404 Not Found` — unknown role
/// - `409 Conflict` — staff members or panel allow-lists still reference it
pub async fn delete_role(
    State(state): State<AppState>,
    Extension(ctx): Extension<StaffContext>,
    Path(role_id): Path<i64>,
) -> Response {
    if let Err(e) = require_capability(&ctx, Capability::ManageRoles) {
        return e.into_response();
    }

    let target = match role::Model::find_by_id(state.db(), role_id).await {
        Ok(Some(target)) => target,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<Empty>::error("Role not found")),
            )
                .into_response();
        }
        Err(e) => return db_error_response(e),
    };

    if let Err(e) = ensure_can_act_on_role(&ctx.role, &target) {
        return domain_error_response(e);
    }

    match role::Model::is_referenced(state.db(), role_id).await {
        Ok(true) => {
            return (
                StatusCode::CONFLICT,
                Json(ApiResponse::<Empty>::error(
                    "Role is still referenced by staff members or panels",
                )),
            )
                .into_response();
        }
        Ok(false) => {}
        Err(e) => return db_error_response(e),
    }

    if let Err(e) = role::Model::delete(state.db(), role_id).await {
        return db_error_response(e);
    }

    audit_log::Model::record(
        state.db(),
        Some(ctx.staff.user_id),
        "role.deleted",
        "role",
        role_id,
        Some(serde_json::json!({ "name": target.name })),
    )
    .await;

    Json(ApiResponse::<()>::success((), "Role deleted successfully")).into_response()
}
