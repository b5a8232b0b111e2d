use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::models::{audit_log, ticket_status};
use db::permissions::Capability;
use serde::Deserialize;
use serde_json::json;
use util::state::AppState;
use validator::Validate;

use crate::auth::claims::StaffContext;
use crate::auth::guards::require_capability;
use crate::response::ApiResponse;
use crate::routes::common::db_error_response;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateStatusRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 64))]
    pub slug: String,
    pub is_default_open: Option<bool>,
    pub is_closed: Option<bool>,
    pub sort_order: Option<i32>,
}

/// POST /api/admin/statuses
///
/// Creates a status. Setting `is_default_open` clears the flag on every
/// other status in the same transaction, keeping exactly one default.
pub async fn create_status(
    State(state): State<AppState>,
    Extension(ctx): Extension<StaffContext>,
    Json(req): Json<CreateStatusRequest>,
) -> Response {
    if let Err(e) = require_capability(&ctx, Capability::ManageStatuses) {
        return e.into_response();
    }
    if let Err(e) = req.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error(format!("Validation failed: {e}"))),
        )
            .into_response();
    }

    match ticket_status::Model::create(
        state.db(),
        &req.name,
        &req.slug,
        req.is_default_open.unwrap_or(false),
        req.is_closed.unwrap_or(false),
        req.sort_order.unwrap_or(0),
    )
    .await
    {
        Ok(status) => {
            audit_log::Model::record(
                state.db(),
                Some(ctx.staff.user_id),
                "status.created",
                "status",
                status.id,
                Some(json!({ "slug": status.slug })),
            )
            .await;
            (
                StatusCode::CREATED,
                Json(ApiResponse::success(status, "Status created successfully")),
            )
                .into_response()
        }
        Err(e) => db_error_response(e),
    }
}
