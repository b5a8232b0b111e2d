use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::models::{audit_log, role};
use db::permissions::{Capability, ensure_can_act_on_role, ensure_grant_allowed};
use serde::Deserialize;
use serde_json::json;
use util::state::AppState;

use crate::auth::claims::StaffContext;
use crate::auth::guards::{Empty, require_capability};
use crate::response::ApiResponse;
use crate::routes::common::{db_error_response, domain_error_response};

use super::common::{RoleResponse, parse_permissions};

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub name: Option<String>,
    pub sort_order: Option<i32>,
    /// `"*"` or an array of capability strings.
    pub permissions: Option<serde_json::Value>,
    pub color: Option<String>,
    pub is_admin: Option<bool>,
}

/// PUT /api/admin/roles/{role_id}
///
/// Edits a role. The actor must strictly outrank the target (admins always
/// pass), may only grant permissions they hold, and only admins may flip
/// `is_admin` in either direction.
pub async fn update_role(
    State(state): State<AppState>,
    Extension(ctx): Extension<StaffContext>,
    Path(role_id): Path<i64>,
    Json(req): Json<UpdateRoleRequest>,
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

    if req.is_admin.is_some() && !ctx.is_admin() {
        return (
            StatusCode::FORBIDDEN,
            Json(ApiResponse::<Empty>::error(
                "Only admins may change a role's admin flag",
            )),
        )
            .into_response();
    }

    let permissions = req.permissions.as_ref().map(parse_permissions);
    if let Some(permissions) = &permissions {
        if let Err(e) = ensure_grant_allowed(&ctx.role, permissions) {
            return domain_error_response(e);
        }
    }

    match role::Model::update(
        state.db(),
        role_id,
        req.name.as_deref(),
        req.sort_order,
        permissions.as_ref(),
        req.color.as_deref(),
        req.is_admin,
    )
    .await
    {
        Ok(role) => {
            audit_log::Model::record(
                state.db(),
                Some(ctx.staff.user_id),
                "role.updated",
                "role",
                role.id,
                Some(json!({ "name": role.name })),
            )
            .await;
            Json(ApiResponse::success(
                RoleResponse::from(role),
                "Role updated successfully",
            ))
            .into_response()
        }
        Err(e) => db_error_response(e),
    }
}
