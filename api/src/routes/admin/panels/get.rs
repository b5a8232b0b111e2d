use axum::{
    Extension, Json,
    extract::State,
    response::{IntoResponse, Response},
};
use db::models::ticket_panel;
use db::permissions::Capability;
use util::state::AppState;

use crate::auth::claims::StaffContext;
use crate::auth::guards::require_capability;
use crate::response::ApiResponse;
use crate::routes::common::db_error_response;

use super::common::PanelResponse;

/// GET /api/admin/panels
///
/// All panels, active or not, with their allow-lists.
pub async fn list_panels(
    State(state): State<AppState>,
    Extension(ctx): Extension<StaffContext>,
) -> Response {
    if let Err(e) = require_capability(&ctx, Capability::ManagePanels) {
        return e.into_response();
    }

    let panels = match ticket_panel::Model::list_all(state.db()).await {
        Ok(panels) => panels,
        Err(e) => return db_error_response(e),
    };

    let mut views = Vec::with_capacity(panels.len());
    for panel in &panels {
        match PanelResponse::load(state.db(), panel).await {
            Ok(view) => views.push(view),
            Err(e) => return db_error_response(e),
        }
    }

    Json(ApiResponse::success(views, "Panels retrieved successfully")).into_response()
}
