//! Route-layer access guards.
//!
//! Each guard decodes the session cookie, resolves the identity against the
//! database and inserts it into request extensions for downstream handlers.
//! Guards fail closed: missing/invalid sessions are 401, missing staff
//! standing is 403, and DB errors while resolving identity deny access.

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use db::models::{staff_member, user};
use db::permissions::{Capability, has_capability};
use sea_orm::EntityTrait;
use std::collections::HashSet;
use util::state::AppState;

use crate::auth::claims::{AuthUser, StaffContext};
use crate::auth::extractors::payload_from_headers;
use crate::response::ApiResponse;

// --- Superuser ---
use once_cell::sync::Lazy;

pub static SUPERUSER_IDS: Lazy<HashSet<i64>> =
    Lazy::new(|| util::config::super_users().into_iter().collect());

pub fn is_superuser(user_id: i64) -> bool {
    SUPERUSER_IDS.contains(&user_id)
}

/// Empty data payload for error envelopes.
#[derive(serde::Serialize, Default)]
pub struct Empty;

type GuardError = (StatusCode, Json<ApiResponse<Empty>>);

fn unauthenticated() -> GuardError {
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiResponse::error("Authentication required")),
    )
}

/// Resolves the session cookie to a user row and inserts `AuthUser` into the
/// request extensions.
async fn extract_and_insert_user(
    state: &AppState,
    mut req: Request<Body>,
) -> Result<(Request<Body>, user::Model), GuardError> {
    let payload = payload_from_headers(req.headers()).ok_or_else(unauthenticated)?;

    let user = user::Entity::find_by_id(payload.sub)
        .one(state.db())
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, user_id = payload.sub, "DB error while resolving session; denying");
            unauthenticated()
        })?
        .ok_or_else(unauthenticated)?;

    req.extensions_mut().insert(AuthUser(user.clone()));
    Ok((req, user))
}

/// Resolves the active staff record (with role) behind the user, if any, and
/// inserts `StaffContext`. Inactive staff resolve to `None` and are
/// indistinguishable from plain users.
async fn extract_and_insert_staff(
    state: &AppState,
    req: Request<Body>,
) -> Result<(Request<Body>, Option<StaffContext>), GuardError> {
    let (mut req, user) = extract_and_insert_user(state, req).await?;

    let ctx = staff_member::Model::find_active_by_user_id(state.db(), user.id)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, user_id = user.id, "DB error while resolving staff; denying");
            unauthenticated()
        })?
        .map(|(staff, role)| StaffContext { staff, role });

    if let Some(ctx) = &ctx {
        req.extensions_mut().insert(ctx.clone());
    }
    Ok((req, ctx))
}

/// Basic guard to ensure the request carries a valid session.
pub async fn allow_authenticated(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, GuardError> {
    let (req, _staff) = extract_and_insert_staff(&state, req).await?;
    Ok(next.run(req).await)
}

/// Guard requiring an active staff member.
pub async fn allow_staff(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, GuardError> {
    let (req, ctx) = extract_and_insert_staff(&state, req).await?;

    if ctx.is_none() {
        return Err((
            StatusCode::FORBIDDEN,
            Json(ApiResponse::error("Staff access required")),
        ));
    }

    Ok(next.run(req).await)
}

/// Capability check used inside staff/admin handlers. Superusers bypass it.
pub fn require_capability(ctx: &StaffContext, cap: Capability) -> Result<(), GuardError> {
    if is_superuser(ctx.staff.user_id) {
        return Ok(());
    }
    if has_capability(&ctx.staff, &ctx.role, cap) {
        Ok(())
    } else {
        Err((
            StatusCode::FORBIDDEN,
            Json(ApiResponse::error(format!(
                "Missing required permission: {cap}"
            ))),
        ))
    }
}
