use axum::{
    Extension, Json,
    extract::State,
    response::{IntoResponse, Response},
};
use db::models::role;
use db::permissions::Capability;
use util::state::AppState;

use crate::auth::claims::StaffContext;
use crate::auth::guards::require_capability;
use crate::response::ApiResponse;
use crate::routes::common::db_error_response;

use super::common::RoleResponse;

/// GET /api/admin/roles
///
/// All roles ordered by seniority (`sort_order` ascending, then name).
pub async fn list_roles(
    State(state): State<AppState>,
    Extension(ctx): Extension<StaffContext>,
) -> Response {
    if let Err(e) = require_capability(&ctx, Capability::ManageRoles) {
        return e.into_response();
    }

    match role::Model::list_all(state.db()).await {
        Ok(roles) => {
            let views: Vec<RoleResponse> = roles.into_iter().map(RoleResponse::from).collect();
            Json(ApiResponse::success(views, "Roles retrieved successfully")).into_response()
        }
        Err(e) => db_error_response(e),
    }
}
