use axum::{Json, http::StatusCode, response::IntoResponse, response::Response};
use db::models::ticket;
use sea_orm::DbConn;

use crate::auth::guards::Empty;
use crate::response::ApiResponse;
use crate::routes::common::db_error_response;

/// Loads a ticket by public id and verifies the requester created it.
///
/// Unknown and foreign tickets are both a 404, so the route never confirms
/// the existence of someone else's ticket.
pub async fn find_owned_ticket(
    db: &DbConn,
    user_id: i64,
    public_id: &str,
) -> Result<ticket::Model, Response> {
    let ticket = ticket::Model::find_by_public_id(db, public_id)
        .await
        .map_err(db_error_response)?;

    match ticket {
        Some(ticket) if ticket.creator_user_id == user_id => Ok(ticket),
        _ => Err((
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<Empty>::error("Ticket not found")),
        )
            .into_response()),
    }
}
