use axum::{Router, routing::post};
use util::state::AppState;

pub mod post;

use post::{login, logout};

/// Builds the `/auth` route group: session establishment and teardown.
///
/// The OAuth code exchange itself happens in the identity-provider
/// collaborator; `/auth/login` receives the already-verified profile.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
}
