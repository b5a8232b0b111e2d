use axum::{
    Extension, Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use db::models::{ticket_attachment, ticket_message};
use util::state::AppState;

use crate::auth::claims::AuthUser;
use crate::auth::guards::Empty;
use crate::response::ApiResponse;
use crate::routes::common::{TicketDetailResponse, TicketResponse, db_error_response, load_messages};
use crate::services::blob::{BlobStore, LocalBlobStore};

use super::common::find_owned_ticket;

/// GET /api/tickets
///
/// Lists the authenticated user's own tickets, newest activity first.
pub async fn list_my_tickets(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
) -> Response {
    match db::models::ticket::Model::list_for_user(state.db(), user.id).await {
        Ok(tickets) => {
            let views: Vec<TicketResponse> = tickets.iter().map(TicketResponse::from).collect();
            Json(ApiResponse::success(views, "Tickets retrieved successfully")).into_response()
        }
        Err(e) => db_error_response(e),
    }
}

/// GET /api/tickets/{public_id}
///
/// Returns one of the user's own tickets with its full message history.
///
/// ### Errors
/// - `404 Not Found` — unknown public id, or a ticket created by someone else
pub async fn get_my_ticket(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(public_id): Path<String>,
) -> Response {
    let ticket = match find_owned_ticket(state.db(), user.id, &public_id).await {
        Ok(ticket) => ticket,
        Err(response) => return response,
    };

    let messages = match load_messages(state.db(), ticket.id).await {
        Ok(messages) => messages,
        Err(e) => return db_error_response(e),
    };

    Json(ApiResponse::success(
        TicketDetailResponse {
            ticket: TicketResponse::from(&ticket),
            messages,
        },
        "Ticket retrieved successfully",
    ))
    .into_response()
}

/// GET /api/tickets/{public_id}/attachments/{attachment_id}
///
/// Streams an attachment's bytes back to the ticket creator.
pub async fn download_attachment(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path((public_id, attachment_id)): Path<(String, i64)>,
) -> Response {
    let ticket = match find_owned_ticket(state.db(), user.id, &public_id).await {
        Ok(ticket) => ticket,
        Err(response) => return response,
    };

    let not_found = || {
        (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<Empty>::error("Attachment not found")),
        )
            .into_response()
    };

    let attachment = match ticket_attachment::Model::find_by_id(state.db(), attachment_id).await {
        Ok(Some(attachment)) => attachment,
        Ok(None) => return not_found(),
        Err(e) => return db_error_response(e),
    };

    // The attachment must hang off a message of this ticket.
    match ticket_message::Model::find_by_id(state.db(), attachment.message_id).await {
        Ok(Some(message)) if message.ticket_id == ticket.id => {}
        Ok(_) => return not_found(),
        Err(e) => return db_error_response(e),
    }

    let store = LocalBlobStore::new();
    match store.get(&attachment.storage_key).await {
        Ok(bytes) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, attachment.mime.clone()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", attachment.filename),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, key = %attachment.storage_key, "attachment blob missing");
            not_found()
        }
    }
}
