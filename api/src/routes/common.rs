//! Response shapes and error mapping shared across route groups.

use axum::{Json, http::StatusCode, response::IntoResponse, response::Response};
use db::error::DomainError;
use db::models::{ticket, ticket_attachment, ticket_claim, ticket_message, user};
use sea_orm::{DbConn, DbErr};
use serde::Serialize;

use crate::auth::guards::Empty;
use crate::response::ApiResponse;

/// Maps a domain error onto the corresponding HTTP response.
///
/// `Forbidden` → 403, `NotFound` → 404, `Conflict` → 409, `Validation` →
/// 400; storage failures are a 500 with a generic message (details go to
/// the log, not the client).
pub fn domain_error_response(err: DomainError) -> Response {
    let (status, message) = match err {
        DomainError::Forbidden(reason) => (StatusCode::FORBIDDEN, reason),
        DomainError::NotFound(what) => (StatusCode::NOT_FOUND, what),
        DomainError::Conflict(reason) => (StatusCode::CONFLICT, reason),
        DomainError::Validation(reason) => (StatusCode::BAD_REQUEST, reason),
        DomainError::Db(e) => {
            tracing::error!(error = %e, "database error while handling request");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    };
    (status, Json(ApiResponse::<Empty>::error(message))).into_response()
}

pub fn db_error_response(err: DbErr) -> Response {
    domain_error_response(DomainError::Db(err))
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub identity_id: Option<String>,
    pub username: String,
    pub email: Option<String>,
    pub discord_dm_enabled: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            identity_id: user.identity_id,
            username: user.username,
            email: user.email,
            discord_dm_enabled: user.discord_dm_enabled,
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TicketResponse {
    pub public_id: String,
    pub panel_id: i64,
    pub status_id: i64,
    pub subject: String,
    pub source: String,
    pub creator_user_id: i64,
    pub assigned_staff_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
    pub closed_at: Option<String>,
    pub last_message_at: String,
}

impl From<&ticket::Model> for TicketResponse {
    fn from(ticket: &ticket::Model) -> Self {
        Self {
            public_id: ticket.public_id.clone(),
            panel_id: ticket.panel_id,
            status_id: ticket.status_id,
            subject: ticket.subject.clone(),
            source: ticket.source.to_string(),
            creator_user_id: ticket.creator_user_id,
            assigned_staff_id: ticket.assigned_staff_id,
            created_at: ticket.created_at.to_rfc3339(),
            updated_at: ticket.updated_at.to_rfc3339(),
            closed_at: ticket.closed_at.map(|t| t.to_rfc3339()),
            last_message_at: ticket.last_message_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AttachmentResponse {
    pub id: i64,
    pub filename: String,
    pub mime: String,
    pub size_bytes: i64,
}

impl From<&ticket_attachment::Model> for AttachmentResponse {
    fn from(attachment: &ticket_attachment::Model) -> Self {
        Self {
            id: attachment.id,
            filename: attachment.filename.clone(),
            mime: attachment.mime.clone(),
            size_bytes: attachment.size_bytes,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub id: i64,
    pub author_user_id: i64,
    pub author_type: String,
    pub body: String,
    pub source: String,
    pub parent_id: Option<i64>,
    pub created_at: String,
    pub attachments: Vec<AttachmentResponse>,
}

#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    pub staff_id: i64,
    pub action: String,
    pub created_at: String,
}

impl From<&ticket_claim::Model> for ClaimResponse {
    fn from(claim: &ticket_claim::Model) -> Self {
        Self {
            staff_id: claim.staff_id,
            action: claim.action.to_string(),
            created_at: claim.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TicketDetailResponse {
    #[serde(flatten)]
    pub ticket: TicketResponse,
    pub messages: Vec<MessageResponse>,
}

/// Loads a ticket's messages with their attachments, oldest first.
pub async fn load_messages(db: &DbConn, ticket_id: i64) -> Result<Vec<MessageResponse>, DbErr> {
    let messages = ticket_message::Model::find_all_for_ticket(db, ticket_id).await?;
    let message_ids: Vec<i64> = messages.iter().map(|m| m.id).collect();
    let attachments = ticket_attachment::Model::find_for_messages(db, &message_ids).await?;

    Ok(messages
        .iter()
        .map(|m| MessageResponse {
            id: m.id,
            author_user_id: m.author_user_id,
            author_type: m.author_type.to_string(),
            body: m.body.clone(),
            source: m.source.to_string(),
            parent_id: m.parent_id,
            created_at: m.created_at.to_rfc3339(),
            attachments: attachments
                .iter()
                .filter(|a| a.message_id == m.id)
                .map(AttachmentResponse::from)
                .collect(),
        })
        .collect())
}
