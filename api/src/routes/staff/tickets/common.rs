use axum::{Json, http::StatusCode, response::IntoResponse, response::Response};
use db::models::{ticket, ticket_panel};
use sea_orm::DbConn;

use crate::auth::claims::StaffContext;
use crate::auth::guards::Empty;
use crate::response::ApiResponse;
use crate::routes::common::db_error_response;

/// Loads a ticket by public id and re-checks panel visibility for the
/// acting staff member. Visibility is evaluated per request, never cached:
/// panel and role configuration can change between requests.
pub async fn find_visible_ticket(
    db: &DbConn,
    ctx: &StaffContext,
    public_id: &str,
) -> Result<ticket::Model, Response> {
    let ticket = ticket::Model::find_by_public_id(db, public_id)
        .await
        .map_err(db_error_response)?
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<Empty>::error("Ticket not found")),
            )
                .into_response()
        })?;

    let visible = ticket_panel::Model::staff_can_access(db, &ctx.role, ticket.panel_id)
        .await
        .map_err(db_error_response)?;

    if !visible {
        return Err((
            StatusCode::FORBIDDEN,
            Json(ApiResponse::<Empty>::error(
                "You do not have access to this ticket's panel",
            )),
        )
            .into_response());
    }

    Ok(ticket)
}
