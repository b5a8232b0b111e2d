use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::models::ticket::{self, TicketSource};
use db::models::ticket_attachment;
use db::models::ticket_message::AuthorType;
use serde::Deserialize;
use util::state::AppState;
use validator::Validate;

use crate::auth::claims::AuthUser;
use crate::events::emit;
use crate::response::ApiResponse;
use crate::routes::common::{TicketResponse, db_error_response, domain_error_response};
use crate::services::blob::{BlobStore, LocalBlobStore, allocate_key};

use super::common::find_owned_ticket;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTicketRequest {
    pub panel_id: i64,
    #[validate(length(min = 1, max = 255))]
    pub subject: String,
    #[validate(length(min = 1))]
    pub message: String,
    #[validate(email)]
    pub email: Option<String>,
}

/// POST /api/tickets
///
/// Opens a new ticket with its first message.
///
/// ### Request Body
/// ```json
/// {
///   "panel_id": 3,
///   "subject": "Cannot log in",
///   "message": "Help",
///   "email": "alice@example.com"
/// }
/// ```
///
/// ### Response: 201 Created
/// - The new ticket, including its opaque public id
///
/// ### Errors
/// - `400 Bad Request` — missing subject/message, inactive panel, or no
///   reachable identity (email or external id)
/// - `404 Not Found` — unknown panel
/// - `409 Conflict` — no ticket statuses configured
pub async fn create_ticket(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Json(req): Json<CreateTicketRequest>,
) -> Response {
    if let Err(e) = req.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error(format!("Validation failed: {e}"))),
        )
            .into_response();
    }

    match ticket::Model::create(
        state.db(),
        req.panel_id,
        &user,
        req.email.as_deref(),
        &req.subject,
        &req.message,
        TicketSource::Web,
    )
    .await
    {
        Ok((ticket, _message)) => {
            emit::ticket_created(&state, &ticket);
            (
                StatusCode::CREATED,
                Json(ApiResponse::success(
                    TicketResponse::from(&ticket),
                    "Ticket created successfully",
                )),
            )
                .into_response()
        }
        Err(e) => domain_error_response(e),
    }
}

/// POST /api/tickets/{public_id}/messages
///
/// Appends a message (multipart: a `body` text field plus any number of
/// file fields) to one of the user's own tickets. Attachment bytes go to
/// the blob store; rows reference them by storage key.
///
/// ### Errors
/// - `400 Bad Request` — empty body
/// - `404 Not Found` — unknown or foreign ticket
pub async fn post_message(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(public_id): Path<String>,
    mut multipart: Multipart,
) -> Response {
    let ticket = match find_owned_ticket(state.db(), user.id, &public_id).await {
        Ok(ticket) => ticket,
        Err(response) => return response,
    };

    let mut body = String::new();
    let mut files: Vec<(String, String, Vec<u8>)> = Vec::new();

    while let Ok(Some(field)) = multipart.next_field().await {
        if let Some(filename) = field.file_name().map(str::to_owned) {
            let mime = field
                .content_type()
                .map(str::to_owned)
                .unwrap_or_else(|| {
                    mime_guess::from_path(&filename)
                        .first_or_octet_stream()
                        .to_string()
                });
            match field.bytes().await {
                Ok(bytes) => files.push((filename, mime, bytes.to_vec())),
                Err(_) => {
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(ApiResponse::<()>::error("Malformed file field")),
                    )
                        .into_response();
                }
            }
        } else if field.name() == Some("body") {
            body = field.text().await.unwrap_or_default();
        }
    }

    let message = match ticket::Model::reply(
        state.db(),
        ticket.id,
        user.id,
        AuthorType::User,
        &body,
        TicketSource::Web,
        None,
    )
    .await
    {
        Ok(message) => message,
        Err(e) => return domain_error_response(e),
    };

    let store = LocalBlobStore::new();
    for (filename, mime, bytes) in files {
        let key = allocate_key(&filename);
        if let Err(e) = store.put(&key, &bytes).await {
            tracing::error!(error = %e, filename, "failed to store attachment blob");
            continue;
        }
        if let Err(e) = ticket_attachment::Model::create(
            state.db(),
            message.id,
            &filename,
            &key,
            &mime,
            bytes.len() as i64,
        )
        .await
        {
            return db_error_response(e);
        }
    }

    emit::ticket_message(&state, &ticket);

    (
        StatusCode::CREATED,
        Json(ApiResponse::success(
            serde_json::json!({ "message_id": message.id }),
            "Message sent successfully",
        )),
    )
        .into_response()
}
