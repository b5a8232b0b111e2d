use axum::{
    Extension, Json,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use db::models::audit_log;
use db::permissions::Capability;
use serde::{Deserialize, Serialize};
use util::state::AppState;

use crate::auth::claims::StaffContext;
use crate::auth::guards::require_capability;
use crate::response::ApiResponse;
use crate::routes::common::db_error_response;

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Serialize)]
pub struct AuditEntryResponse {
    pub id: i64,
    pub actor_user_id: Option<i64>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: i64,
    pub metadata: Option<serde_json::Value>,
    pub created_at: String,
}

#[derive(Serialize)]
pub struct AuditPageResponse {
    pub entries: Vec<AuditEntryResponse>,
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
}

/// GET /api/admin/audit
///
/// Newest-first page of the append-only audit trail.
pub async fn list_audit(
    State(state): State<AppState>,
    Extension(ctx): Extension<StaffContext>,
    Query(query): Query<AuditQuery>,
) -> Response {
    if let Err(e) = require_capability(&ctx, Capability::ViewAuditLog) {
        return e.into_response();
    }

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(50).clamp(1, 200);

    match audit_log::Model::list_page(state.db(), page, per_page).await {
        Ok((entries, total)) => {
            let views: Vec<AuditEntryResponse> = entries
                .into_iter()
                .map(|entry| AuditEntryResponse {
                    id: entry.id,
                    actor_user_id: entry.actor_user_id,
                    action: entry.action,
                    entity_type: entry.entity_type,
                    entity_id: entry.entity_id,
                    metadata: entry.metadata.and_then(|m| serde_json::from_str(&m).ok()),
                    created_at: entry.created_at.to_rfc3339(),
                })
                .collect();
            Json(ApiResponse::success(
                AuditPageResponse {
                    entries: views,
                    page,
                    per_page,
                    total,
                },
                "Audit log retrieved successfully",
            ))
            .into_response()
        }
        Err(e) => db_error_response(e),
    }
}
