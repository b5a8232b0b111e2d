use axum::{
    Json,
    extract::State,
    http::{StatusCode, header::SET_COOKIE},
    response::IntoResponse,
};
use db::models::user;
use serde::Deserialize;
use util::state::AppState;
use validator::Validate;

use crate::auth::{clear_session_cookie_header, session_cookie_header};
use crate::response::ApiResponse;
use crate::routes::common::{UserResponse, db_error_response};

/// A verified external profile, as delivered by the OAuth collaborator
/// after it has completed the code exchange.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 64))]
    pub identity_id: String,
    #[validate(length(min = 1, max = 255))]
    pub username: String,
    #[validate(email)]
    pub email: Option<String>,
}

/// POST /api/auth/login
///
/// Upserts the user from a verified external profile and establishes a
/// session cookie. Created on first login; profile fields are refreshed on
/// every subsequent login.
///
/// ### Request Body
/// ```json
/// {
///   "identity_id": "190523162828816384",
///   "username": "alice",
///   "email": "alice@example.com"
/// }
/// ```
///
/// ### Errors
/// - `400 Bad Request` — validation failure
pub async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> impl IntoResponse {
    if let Err(e) = req.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error(format!("Validation failed: {e}"))),
        )
            .into_response();
    }

    let user = match user::Model::upsert_from_profile(
        state.db(),
        &req.identity_id,
        &req.username,
        req.email.as_deref(),
    )
    .await
    {
        Ok(user) => user,
        Err(e) => return db_error_response(e),
    };

    let cookie = session_cookie_header(user.id);
    (
        StatusCode::OK,
        [(SET_COOKIE, cookie)],
        Json(ApiResponse::<UserResponse>::success(
            user.into(),
            "Logged in successfully",
        )),
    )
        .into_response()
}

/// POST /api/auth/logout
///
/// Clears the session cookie. Always succeeds; the token itself is not
/// revocable server-side (expiry is carried by the cookie).
pub async fn logout() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(SET_COOKIE, clear_session_cookie_header())],
        Json(ApiResponse::<()>::success((), "Logged out")),
    )
}
