use axum::{Json, http::StatusCode, response::IntoResponse, response::Response};
use db::models::{role, staff_member};
use sea_orm::DbConn;
use serde::Serialize;

use crate::auth::claims::StaffContext;
use crate::auth::guards::Empty;
use crate::response::ApiResponse;
use crate::routes::common::{db_error_response, domain_error_response};

#[derive(Serialize)]
pub struct StaffAdminResponse {
    pub id: i64,
    pub user_id: i64,
    pub role_id: i64,
    pub role_name: Option<String>,
    pub active: bool,
    pub nickname: Option<String>,
    pub pay_per_ticket: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl StaffAdminResponse {
    pub fn new(staff: staff_member::Model, role_name: Option<String>) -> Self {
        Self {
            id: staff.id,
            user_id: staff.user_id,
            role_id: staff.role_id,
            role_name,
            active: staff.active,
            nickname: staff.nickname,
            pay_per_ticket: staff.pay_per_ticket,
            created_at: staff.created_at.to_rfc3339(),
            updated_at: staff.updated_at.to_rfc3339(),
        }
    }
}

/// Loads a target staff member with their role and enforces the hierarchy
/// rule: the actor must strictly outrank the target's current role.
pub async fn find_managed_staff(
    db: &DbConn,
    ctx: &StaffContext,
    staff_id: i64,
) -> Result<(staff_member::Model, role::Model), Response> {
    let (staff, role) = staff_member::Model::find_with_role(db, staff_id)
        .await
        .map_err(db_error_response)?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<Empty>::error("Staff member not found")),
            )
                .into_response()
        })?;

    db::permissions::ensure_can_act_on_role(&ctx.role, &role).map_err(domain_error_response)?;

    Ok((staff, role))
}
