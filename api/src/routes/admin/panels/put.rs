use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::models::{audit_log, panel_role_access, ticket_panel};
use db::permissions::Capability;
use serde::Deserialize;
use serde_json::json;
use util::state::AppState;

use crate::auth::claims::StaffContext;
use crate::auth::guards::{Empty, require_capability};
use crate::response::ApiResponse;
use crate::routes::common::db_error_response;

use super::common::PanelResponse;

#[derive(Debug, Deserialize)]
pub struct UpdatePanelRequest {
    pub name: Option<String>,
    pub active: Option<bool>,
    pub sort_order: Option<i32>,
    /// When present, replaces the allow-list wholesale; an empty list lifts
    /// the restriction.
    pub role_ids: Option<Vec<i64>>,
}

/// PUT /api/admin/panels/{panel_id}
pub async fn update_panel(
    State(state): State<AppState>,
    Extension(ctx): Extension<StaffContext>,
    Path(panel_id): Path<i64>,
    Json(req): Json<UpdatePanelRequest>,
) -> Response {
    if let Err(e) = require_capability(&ctx, Capability::ManagePanels) {
        return e.into_response();
    }

    match ticket_panel::Model::find_by_id(state.db(), panel_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<Empty>::error("Panel not found")),
            )
                .into_response();
        }
        Err(e) => return db_error_response(e),
    }

    let panel = match ticket_panel::Model::update(
        state.db(),
        panel_id,
        req.name.as_deref(),
        req.active,
        req.sort_order,
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
        "panel.updated",
        "panel",
        panel.id,
        Some(json!({ "name": panel.name })),
    )
    .await;

    match PanelResponse::load(state.db(), &panel).await {
        Ok(view) => {
            Json(ApiResponse::success(view, "Panel updated successfully")).into_response()
        }
        Err(e) => db_error_response(e),
    }
}
