use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::models::{audit_log, panel_role_access, ticket_panel};
use db::permissions::Capability;
use serde::Deserialize;
use serde_json::json;
use util::state::AppState;
use validator::Validate;

use crate::auth::claims::StaffContext;
use crate::auth::guards::require_capability;
use crate::response::ApiResponse;
use crate::routes::common::db_error_response;

use super::common::PanelResponse;

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePanelRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub active: Option<bool>,
    pub sort_order: Option<i32>,
    /// Optional allow-list; omit or pass an empty list for an unrestricted
    /// panel.
    pub role_ids: Option<Vec<i64>>,
}

/// POST /api/admin/panels
///
/// Creates a panel, optionally restricted to the given roles.
pub async fn create_panel(
    State(state): State<AppState>,
    Extension(ctx): Extension<StaffContext>,
    Json(req): Json<CreatePanelRequest>,
) -> Response {
    if let Err(e) = require_capability(&ctx, Capability::ManagePanels) {
        return e.into_response();
    }
    if let Err(e) = req.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error(format!("Validation failed: {e}"))),
        )
            .into_response();
    }

    let panel = match ticket_panel::Model::create(
        state.db(),
        &req.name,
        req.active.unwrap_or(true),
        req.sort_order.unwrap_or(0),
    )
    .await
    {
        Ok(panel) => panel,
        Err(e) => return db_error_response(e),
    };

    if let Some(role_ids) = &req.role_ids {
        if let Err(e) = panel_role_access::Model::set_for_panel(state.db(), panel.id, role_ids).await
        {
            return db_error_response(e);
        }
    }

    audit_log::Model::record(
        state.db(),
        Some(ctx.staff.user_id),
        "panel.created",
        "panel",
        panel.id,
        Some(json!({ "name": panel.name })),
    )
    .await;

    match PanelResponse::load(state.db(), &panel).await {
        Ok(view) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(view, "Panel created successfully")),
        )
            .into_response(),
        Err(e) => db_error_response(e),
    }
}
