use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::models::{audit_log, ticket_status};
use db::permissions::Capability;
use serde::Deserialize;
use serde_json::json;
use util::state::AppState;

use crate::auth::claims::StaffContext;
use crate::auth::guards::{Empty, require_capability};
use crate::response::ApiResponse;
use crate::routes::common::db_error_response;

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub name: Option<String>,
    pub is_default_open: Option<bool>,
    pub is_closed: Option<bool>,
    pub sort_order: Option<i32>,
}

/// PUT /api/admin/statuses/{status_id}
pub async fn update_status(
    State(state): State<AppState>,
    Extension(ctx): Extension<StaffContext>,
    Path(status_id): Path<i64>,
    Json(req): Json<UpdateStatusRequest>,
) -> Response {
    if let Err(e) = require_capability(&ctx, Capability::ManageStatuses) {
        return e.into_response();
    }

    match ticket_status::Model::find_by_id(state.db(), status_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<Empty>::error("Ticket status not found")),
            )
                .into_response();
        }
        Err(e) => return db_error_response(e),
    }

    match ticket_status::Model::update(
        state.db(),
        status_id,
        req.name.as_deref(),
        req.is_default_open,
        req.is_closed,
        req.sort_order,
    )
    .await
    {
        Ok(status) => {
            audit_log::Model::record(
                state.db(),
                Some(ctx.staff.user_id),
                "status.updated",
                "status",
                status.id,
                Some(json!({ "slug": status.slug })),
            )
            .await;
            Json(ApiResponse::success(status, "Status updated successfully")).into_response()
        }
        Err(e) => db_error_response(e),
    }
}
