use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::models::{audit_log, role, staff_member, staff_pay_adjustment, user};
use db::permissions::{Capability, ensure_can_act_on_role};
use sea_orm::EntityTrait;
use serde::Deserialize;
use serde_json::json;
use util::state::AppState;
use validator::Validate;

use crate::auth::claims::StaffContext;
use crate::auth::guards::{Empty, require_capability};
use crate::response::ApiResponse;
use crate::routes::common::{db_error_response, domain_error_response};

use super::common::{StaffAdminResponse, find_managed_staff};

#[derive(Debug, Deserialize)]
pub struct CreateStaffRequest {
    pub user_id: i64,
    pub role_id: i64,
    pub nickname: Option<String>,
    pub pay_per_ticket: Option<i64>,
}

/// POST /api/admin/staff
///
/// Promotes an existing user to staff with the given role. The actor must
/// outrank the role being assigned.
///
/// ### Errors
/// - `403 Forbidden` — hierarchy violation
/// - `404 Not Found` — unknown user or role
/// - `409 Conflict` — the user is already a staff member
pub async fn create_staff(
    State(state): State<AppState>,
    Extension(ctx): Extension<StaffContext>,
    Json(req): Json<CreateStaffRequest>,
) -> Response {
    if let Err(e) = require_capability(&ctx, Capability::ManageStaff) {
        return e.into_response();
    }

    match user::Entity::find_by_id(req.user_id).one(state.db()).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<Empty>::error("User not found")),
            )
                .into_response();
        }
        Err(e) => return db_error_response(e),
    }

    let target_role = match role::Model::find_by_id(state.db(), req.role_id).await {
        Ok(Some(role)) => role,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<Empty>::error("Role not found")),
            )
                .into_response();
        }
        Err(e) => return db_error_response(e),
    };

    if let Err(e) = ensure_can_act_on_role(&ctx.role, &target_role) {
        return domain_error_response(e);
    }

    match staff_member::Model::find_by_user_id(state.db(), req.user_id).await {
        Ok(Some(_)) => {
            return (
                StatusCode::CONFLICT,
                Json(ApiResponse::<Empty>::error(
                    "User is already a staff member",
                )),
            )
                .into_response();
        }
        Ok(None) => {}
        Err(e) => return db_error_response(e),
    }

    match staff_member::Model::create(
        state.db(),
        req.user_id,
        req.role_id,
        req.nickname.as_deref(),
        req.pay_per_ticket.unwrap_or(0),
    )
    .await
    {
        Ok(staff) => {
            audit_log::Model::record(
                state.db(),
                Some(ctx.staff.user_id),
                "staff.created",
                "staff",
                staff.id,
                Some(json!({ "user_id": staff.user_id, "role_id": staff.role_id })),
            )
            .await;
            (
                StatusCode::CREATED,
                Json(ApiResponse::success(
                    StaffAdminResponse::new(staff, Some(target_role.name)),
                    "Staff member created successfully",
                )),
            )
                .into_response()
        }
        Err(e) => db_error_response(e),
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct PayAdjustmentRequest {
    /// Positive amount in cents; docks are stored negative by the ledger.
    pub amount: i64,
    #[validate(length(min = 1, max = 512))]
    pub reason: String,
}

/// POST /api/admin/staff/{staff_id}/pay/bonus
///
/// Awards a bonus: one positive ledger entry, one `pay.bonus` notification
/// and one audit entry.
pub async fn pay_bonus(
    State(state): State<AppState>,
    Extension(ctx): Extension<StaffContext>,
    Path(staff_id): Path<i64>,
    Json(req): Json<PayAdjustmentRequest>,
) -> Response {
    adjust_pay(state, ctx, staff_id, req, true).await
}

/// POST /api/admin/staff/{staff_id}/pay/dock
pub async fn pay_dock(
    State(state): State<AppState>,
    Extension(ctx): Extension<StaffContext>,
    Path(staff_id): Path<i64>,
    Json(req): Json<PayAdjustmentRequest>,
) -> Response {
    adjust_pay(state, ctx, staff_id, req, false).await
}

async fn adjust_pay(
    state: AppState,
    ctx: StaffContext,
    staff_id: i64,
    req: PayAdjustmentRequest,
    bonus: bool,
) -> Response {
    if let Err(e) = require_capability(&ctx, Capability::ManagePay) {
        return e.into_response();
    }
    if let Err(e) = req.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error(format!("Validation failed: {e}"))),
        )
            .into_response();
    }

    if let Err(response) = find_managed_staff(state.db(), &ctx, staff_id).await {
        return response;
    }

    let result = if bonus {
        staff_pay_adjustment::Model::bonus(
            state.db(),
            staff_id,
            req.amount,
            &req.reason,
            ctx.staff.user_id,
        )
        .await
    } else {
        staff_pay_adjustment::Model::dock(
            state.db(),
            staff_id,
            req.amount,
            &req.reason,
            ctx.staff.user_id,
        )
        .await
    };

    match result {
        Ok(entry) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(
                json!({ "id": entry.id, "amount": entry.amount, "reason": entry.reason }),
                if bonus {
                    "Bonus recorded successfully"
                } else {
                    "Dock recorded successfully"
                },
            )),
        )
            .into_response(),
        Err(e) => domain_error_response(e),
    }
}
