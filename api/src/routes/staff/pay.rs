//! Derived pay views for the acting staff member, plus the role-grouped
//! monthly leaderboard.

use axum::{
    Extension, Json,
    extract::State,
    response::{IntoResponse, Response},
};
use db::models::staff_pay_adjustment;
use db::pay;
use serde::Serialize;
use util::state::AppState;

use crate::auth::claims::StaffContext;
use crate::response::ApiResponse;
use crate::routes::common::db_error_response;

#[derive(Serialize)]
pub struct AdjustmentResponse {
    pub amount: i64,
    pub reason: String,
    pub created_at: String,
}

#[derive(Serialize)]
pub struct PayResponse {
    pub earnings: pay::EarningsView,
    pub adjustments: Vec<AdjustmentResponse>,
}

/// GET /api/staff/pay
///
/// The acting member's current-month earnings: claimed tickets ×
/// `pay_per_ticket`, with ledger adjustments reported alongside.
pub async fn get_my_pay(
    State(state): State<AppState>,
    Extension(ctx): Extension<StaffContext>,
) -> Response {
    let earnings = match pay::monthly_earnings(state.db(), &ctx.staff).await {
        Ok(earnings) => earnings,
        Err(e) => return db_error_response(e),
    };

    let adjustments = match staff_pay_adjustment::Model::list_for_staff(state.db(), ctx.staff.id).await {
        Ok(rows) => rows
            .into_iter()
            .map(|row| AdjustmentResponse {
                amount: row.amount,
                reason: row.reason,
                created_at: row.created_at.to_rfc3339(),
            })
            .collect(),
        Err(e) => return db_error_response(e),
    };

    Json(ApiResponse::success(
        PayResponse { earnings, adjustments },
        "Pay retrieved successfully",
    ))
    .into_response()
}

/// GET /api/staff/leaderboard
///
/// Active staff grouped by role, ranked within each group by distinct
/// tickets replied to this month.
pub async fn get_leaderboard(State(state): State<AppState>) -> Response {
    match pay::leaderboard(state.db()).await {
        Ok(groups) => {
            Json(ApiResponse::success(groups, "Leaderboard retrieved successfully")).into_response()
        }
        Err(e) => db_error_response(e),
    }
}
