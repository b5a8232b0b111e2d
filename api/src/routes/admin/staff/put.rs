use axum::{
    Extension, Json,
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use db::models::{audit_log, role, staff_member, staff_notification};
use db::permissions::{Capability, ensure_can_act_on_role};
use serde::Deserialize;
use serde_json::json;
use util::state::AppState;

use crate::auth::claims::StaffContext;
use crate::auth::guards::{Empty, require_capability};
use crate::response::ApiResponse;
use crate::routes::common::{db_error_response, domain_error_response};

use super::common::{StaffAdminResponse, find_managed_staff};

#[derive(Debug, Deserialize)]
pub struct UpdateStaffRequest {
    pub role_id: Option<i64>,
    pub active: Option<bool>,
    pub nickname: Option<String>,
    pub pay_per_ticket: Option<i64>,
}

/// PUT /api/admin/staff/{staff_id}
///
/// Updates a staff member: role assignment, suspension/reactivation,
/// nickname, pay rate. The actor must outrank the target's current role
/// and, for a role change, the new role as well. Deactivation revokes
/// authorization immediately and unassigns the member's tickets. A pay-rate
/// change leaves a `pay.rate` notification carrying the old and new values.
pub async fn update_staff(
    State(state): State<AppState>,
    Extension(ctx): Extension<StaffContext>,
    Path(staff_id): Path<i64>,
    Json(req): Json<UpdateStaffRequest>,
) -> Response {
    if let Err(e) = require_capability(&ctx, Capability::ManageStaff) {
        return e.into_response();
    }

    let (staff, _current_role) = match find_managed_staff(state.db(), &ctx, staff_id).await {
        Ok(pair) => pair,
        Err(response) => return response,
    };

    let mut changes = serde_json::Map::new();

    if let Some(role_id) = req.role_id {
        let new_role = match role::Model::find_by_id(state.db(), role_id).await {
            Ok(Some(role)) => role,
            Ok(None) => {
                return (
                    axum::http::StatusCode::NOT_FOUND,
                    Json(ApiResponse::<Empty>::error("Role not found")),
                )
                    .into_response();
            }
            Err(e) => return db_error_response(e),
        };
        if let Err(e) = ensure_can_act_on_role(&ctx.role, &new_role) {
            return domain_error_response(e);
        }
        if let Err(e) = staff_member::Model::set_role(state.db(), staff_id, role_id).await {
            return db_error_response(e);
        }
        changes.insert("role_id".into(), json!(role_id));
    }

    if let Some(nickname) = &req.nickname {
        if let Err(e) =
            staff_member::Model::set_nickname(state.db(), staff_id, Some(nickname)).await
        {
            return db_error_response(e);
        }
        changes.insert("nickname".into(), json!(nickname));
    }

    if let Some(pay_per_ticket) = req.pay_per_ticket {
        if pay_per_ticket != staff.pay_per_ticket {
            if let Err(e) =
                staff_member::Model::set_pay_rate(state.db(), staff_id, pay_per_ticket).await
            {
                return db_error_response(e);
            }
            if let Err(e) = staff_notification::Model::create(
                state.db(),
                staff_id,
                "pay.rate",
                &format!(
                    "Your pay per ticket changed from {} to {}",
                    staff.pay_per_ticket, pay_per_ticket
                ),
                Some(json!({ "old": staff.pay_per_ticket, "new": pay_per_ticket })),
            )
            .await
            {
                return db_error_response(e);
            }
            changes.insert("pay_per_ticket".into(), json!(pay_per_ticket));
        }
    }

    if let Some(active) = req.active {
        if let Err(e) = staff_member::Model::set_active(state.db(), staff_id, active).await {
            return db_error_response(e);
        }
        changes.insert("active".into(), json!(active));
    }

    audit_log::Model::record(
        state.db(),
        Some(ctx.staff.user_id),
        "staff.updated",
        "staff",
        staff_id,
        Some(serde_json::Value::Object(changes)),
    )
    .await;

    match staff_member::Model::find_with_role(state.db(), staff_id).await {
        Ok(Some((staff, role))) => Json(ApiResponse::success(
            StaffAdminResponse::new(staff, Some(role.name)),
            "Staff member updated successfully",
        ))
        .into_response(),
        Ok(None) => (
            axum::http::StatusCode::NOT_FOUND,
            Json(ApiResponse::<Empty>::error("Staff member not found")),
        )
            .into_response(),
        Err(e) => db_error_response(e),
    }
}
