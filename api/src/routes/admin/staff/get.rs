use axum::{
    Extension, Json,
    extract::State,
    response::{IntoResponse, Response},
};
use db::models::staff_member;
use db::permissions::Capability;
use util::state::AppState;

use crate::auth::claims::StaffContext;
use crate::auth::guards::require_capability;
use crate::response::ApiResponse;
use crate::routes::common::db_error_response;

use super::common::StaffAdminResponse;

/// GET /api/admin/staff
///
/// All staff members, active and suspended, with their roles.
pub async fn list_staff(
    State(state): State<AppState>,
    Extension(ctx): Extension<StaffContext>,
) -> Response {
    if let Err(e) = require_capability(&ctx, Capability::ManageStaff) {
        return e.into_response();
    }

    match staff_member::Model::list_all(state.db()).await {
        Ok(rows) => {
            let views: Vec<StaffAdminResponse> = rows
                .into_iter()
                .map(|(staff, role)| StaffAdminResponse::new(staff, role.map(|r| r.name)))
                .collect();
            Json(ApiResponse::success(views, "Staff retrieved successfully")).into_response()
        }
        Err(e) => db_error_response(e),
    }
}
