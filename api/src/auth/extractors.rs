use axum::http::HeaderMap;
use axum_extra::extract::cookie::CookieJar;
use util::config;

use crate::auth::SESSION_COOKIE;
use crate::auth::session::{self, SessionPayload};

/// Decodes the session cookie out of a request's headers.
///
/// Fails closed: a missing cookie, a malformed token or a bad signature all
/// resolve to "no identity".
pub fn payload_from_headers(headers: &HeaderMap) -> Option<SessionPayload> {
    let jar = CookieJar::from_headers(headers);
    let cookie = jar.get(SESSION_COOKIE)?;
    session::decode(&config::session_secret(), cookie.value())
}
