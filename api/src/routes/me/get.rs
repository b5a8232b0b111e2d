use axum::{Extension, Json, response::IntoResponse};
use serde::Serialize;

use crate::auth::claims::{AuthUser, StaffContext};
use crate::response::ApiResponse;
use crate::routes::common::UserResponse;

#[derive(Serialize)]
pub struct StaffResponse {
    pub id: i64,
    pub role_id: i64,
    pub role_name: String,
    pub is_admin: bool,
    pub nickname: Option<String>,
    pub pay_per_ticket: i64,
}

#[derive(Serialize)]
pub struct MeResponse {
    pub user: UserResponse,
    /// Present only for active staff members.
    pub staff: Option<StaffResponse>,
}

/// GET /api/me
///
/// Returns the authenticated user and, for active staff, their staff record
/// and role.
pub async fn get_me(
    Extension(AuthUser(user)): Extension<AuthUser>,
    staff: Option<Extension<StaffContext>>,
) -> impl IntoResponse {
    let staff = staff.map(|Extension(ctx)| StaffResponse {
        id: ctx.staff.id,
        role_id: ctx.role.id,
        role_name: ctx.role.name.clone(),
        is_admin: ctx.role.is_admin,
        nickname: ctx.staff.nickname.clone(),
        pay_per_ticket: ctx.staff.pay_per_ticket,
    });

    Json(ApiResponse::success(
        MeResponse {
            user: user.into(),
            staff,
        },
        "Profile retrieved successfully",
    ))
}
