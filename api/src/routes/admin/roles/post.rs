use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::models::{audit_log, role};
use db::permissions::{Capability, ensure_grant_allowed};
use serde::Deserialize;
use serde_json::json;
use util::state::AppState;
use validator::Validate;

use crate::auth::claims::StaffContext;
use crate::auth::guards::require_capability;
use crate::response::ApiResponse;
use crate::routes::common::{db_error_response, domain_error_response};

use super::common::{RoleResponse, parse_permissions};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRoleRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub sort_order: Option<i32>,
    /// `"*"` or an array of capability strings.
    pub permissions: serde_json::Value,
    pub color: Option<String>,
    pub is_admin: Option<bool>,
}

/// POST /api/admin/roles
///
/// Creates a role. A non-admin actor may only grant permissions they
/// already hold, and may never create an admin role.
pub async fn create_role(
    State(state): State<AppState>,
    Extension(ctx): Extension<StaffContext>,
    Json(req): Json<CreateRoleRequest>,
) -> Response {
    if let Err(e) = require_capability(&ctx, Capability::ManageRoles) {
        return e.into_response();
    }
    if let Err(e) = req.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error(format!("Validation failed: {e}"))),
        )
            .into_response();
    }

    let is_admin = req.is_admin.unwrap_or(false);
    if is_admin && !ctx.is_admin() {
        return (
            StatusCode::FORBIDDEN,
            Json(ApiResponse::<()>::error(
                "Only admins may create an admin role",
            )),
        )
            .into_response();
    }

    let permissions = parse_permissions(&req.permissions);
    if let Err(e) = ensure_grant_allowed(&ctx.role, &permissions) {
        return domain_error_response(e);
    }

    match role::Model::create(
        state.db(),
        &req.name,
        req.sort_order,
        is_admin,
        &permissions,
        req.color.as_deref(),
    )
    .await
    {
        Ok(role) => {
            audit_log::Model::record(
                state.db(),
                Some(ctx.staff.user_id),
                "role.created",
                "role",
                role.id,
                Some(json!({ "name": role.name })),
            )
            .await;
            (
                StatusCode::CREATED,
                Json(ApiResponse::success(
                    RoleResponse::from(role),
                    "Role created successfully",
                )),
            )
                .into_response()
        }
        Err(e) => db_error_response(e),
    }
}
