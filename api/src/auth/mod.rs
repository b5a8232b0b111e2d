pub mod claims;
pub mod extractors;
pub mod guards;
pub mod middleware;
pub mod session;

pub use claims::{AuthUser, StaffContext};

use util::config;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session";

/// Builds the `Set-Cookie` header value establishing a session for the user.
///
/// Expiry is carried by `Max-Age` only; the token itself has no expiry claim.
pub fn session_cookie_header(user_id: i64) -> String {
    let token = session::encode(
        &config::session_secret(),
        &session::SessionPayload::new(user_id),
    );
    format!(
        "{SESSION_COOKIE}={token}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        config::session_max_age_seconds()
    )
}

/// Builds the `Set-Cookie` header value that clears the session.
pub fn clear_session_cookie_header() -> String {
    format!("{SESSION_COOKIE}=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0")
}
