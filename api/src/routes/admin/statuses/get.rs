use axum::{
    Extension, Json,
    extract::State,
    response::{IntoResponse, Response},
};
use db::models::ticket_status;
use db::permissions::Capability;
use util::state::AppState;

use crate::auth::claims::StaffContext;
use crate::auth::guards::require_capability;
use crate::response::ApiResponse;
use crate::routes::common::db_error_response;

/// GET /api/admin/statuses
pub async fn list_statuses(
    State(state): State<AppState>,
    Extension(ctx): Extension<StaffContext>,
) -> Response {
    if let Err(e) = require_capability(&ctx, Capability::ManageStatuses) {
        return e.into_response();
    }

    match ticket_status::Model::list_all(state.db()).await {
        Ok(statuses) => {
            Json(ApiResponse::success(statuses, "Statuses retrieved successfully")).into_response()
        }
        Err(e) => db_error_response(e),
    }
}
