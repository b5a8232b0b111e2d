use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::models::ticket::{self, TicketSource};
use db::models::ticket_message::AuthorType;
use db::models::ticket_transcript::{self, TranscriptTrigger};
use db::models::user;
use db::permissions::Capability;
use sea_orm::{DbConn, EntityTrait};
use serde::Deserialize;
use util::state::AppState;
use validator::Validate;

use crate::auth::claims::StaffContext;
use crate::events::emit;
use crate::response::ApiResponse;
use crate::routes::common::{TicketResponse, db_error_response, domain_error_response};
use crate::services::notifier::notifier;

use super::common::find_visible_ticket;

/// Best-effort DM to the creator of a discord-sourced ticket. Never fails
/// the triggering operation.
async fn notify_creator_update(db: &DbConn, ticket: &ticket::Model, summary: &str) {
    if ticket.source != TicketSource::Discord {
        return;
    }
    if let Ok(Some(creator)) = user::Entity::find_by_id(ticket.creator_user_id).one(db).await {
        notifier().send_ticket_update_dm(&creator, ticket, summary).await;
    }
}

fn updated_response(ticket: &ticket::Model, message: &str) -> Response {
    Json(ApiResponse::success(TicketResponse::from(ticket), message)).into_response()
}

fn require(ctx: &StaffContext, cap: Capability) -> Result<(), Response> {
    crate::auth::guards::require_capability(ctx, cap).map_err(|e| e.into_response())
}

#[derive(Debug, Deserialize, Validate)]
pub struct StaffReplyRequest {
    #[validate(length(min = 1))]
    pub body: String,
    pub parent_id: Option<i64>,
}

/// POST /api/staff/tickets/{public_id}/messages
///
/// Appends a staff reply. Replies to discord-sourced tickets are also
/// handed to the Discord collaborator for DM delivery (best-effort).
pub async fn staff_reply(
    State(state): State<AppState>,
    Extension(ctx): Extension<StaffContext>,
    Path(public_id): Path<String>,
    Json(req): Json<StaffReplyRequest>,
) -> Response {
    if let Err(e) = require(&ctx, Capability::ReplyTickets) {
        return e;
    }
    if let Err(e) = req.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error(format!("Validation failed: {e}"))),
        )
            .into_response();
    }

    let ticket = match find_visible_ticket(state.db(), &ctx, &public_id).await {
        Ok(ticket) => ticket,
        Err(response) => return response,
    };

    let message = match ticket::Model::reply(
        state.db(),
        ticket.id,
        ctx.staff.user_id,
        AuthorType::Staff,
        &req.body,
        TicketSource::Web,
        req.parent_id,
    )
    .await
    {
        Ok(message) => message,
        Err(e) => return domain_error_response(e),
    };

    if ticket.source == TicketSource::Discord {
        if let Ok(Some(creator)) = user::Entity::find_by_id(ticket.creator_user_id)
            .one(state.db())
            .await
        {
            notifier()
                .send_ticket_dm_reply(&creator, &ticket, &req.body)
                .await;
        }
    }

    emit::ticket_message(&state, &ticket);

    (
        StatusCode::CREATED,
        Json(ApiResponse::success(
            serde_json::json!({ "message_id": message.id }),
            "Reply sent successfully",
        )),
    )
        .into_response()
}

/// POST /api/staff/tickets/{public_id}/claim
///
/// Self-assigns the acting member. A claim-history row is appended even
/// when the ticket was already claimed; concurrent claims are
/// last-write-wins by design.
pub async fn claim_ticket(
    State(state): State<AppState>,
    Extension(ctx): Extension<StaffContext>,
    Path(public_id): Path<String>,
) -> Response {
    if let Err(e) = require(&ctx, Capability::ClaimTickets) {
        return e;
    }
    let ticket = match find_visible_ticket(state.db(), &ctx, &public_id).await {
        Ok(ticket) => ticket,
        Err(response) => return response,
    };

    match ticket::Model::claim(state.db(), ticket.id, &ctx.staff).await {
        Ok(updated) => {
            emit::ticket_updated(&state, &updated);
            updated_response(&updated, "Ticket claimed successfully")
        }
        Err(e) => domain_error_response(e),
    }
}

/// POST /api/staff/tickets/{public_id}/unclaim
pub async fn unclaim_ticket(
    State(state): State<AppState>,
    Extension(ctx): Extension<StaffContext>,
    Path(public_id): Path<String>,
) -> Response {
    if let Err(e) = require(&ctx, Capability::ClaimTickets) {
        return e;
    }
    let ticket = match find_visible_ticket(state.db(), &ctx, &public_id).await {
        Ok(ticket) => ticket,
        Err(response) => return response,
    };

    match ticket::Model::unclaim(state.db(), ticket.id, &ctx.staff).await {
        Ok(updated) => {
            emit::ticket_updated(&state, &updated);
            updated_response(&updated, "Ticket unclaimed successfully")
        }
        Err(e) => domain_error_response(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    /// Target staff id; `null` clears the assignment.
    pub staff_id: Option<i64>,
}

/// POST /api/staff/tickets/{public_id}/assign
///
/// Managerial assignment to an arbitrary active staff member (or nobody),
/// independent of claim history.
pub async fn assign_ticket(
    State(state): State<AppState>,
    Extension(ctx): Extension<StaffContext>,
    Path(public_id): Path<String>,
    Json(req): Json<AssignRequest>,
) -> Response {
    if let Err(e) = require(&ctx, Capability::AssignTickets) {
        return e;
    }
    let ticket = match find_visible_ticket(state.db(), &ctx, &public_id).await {
        Ok(ticket) => ticket,
        Err(response) => return response,
    };

    match ticket::Model::assign(state.db(), ticket.id, req.staff_id, ctx.staff.user_id).await {
        Ok(updated) => {
            emit::ticket_updated(&state, &updated);
            updated_response(&updated, "Ticket assigned successfully")
        }
        Err(e) => domain_error_response(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status_id: i64,
}

/// POST /api/staff/tickets/{public_id}/status
///
/// Moves the ticket to an arbitrary configured status. Closed-flagged
/// statuses set `closed_at`; open statuses clear it.
pub async fn set_status(
    State(state): State<AppState>,
    Extension(ctx): Extension<StaffContext>,
    Path(public_id): Path<String>,
    Json(req): Json<SetStatusRequest>,
) -> Response {
    if let Err(e) = require(&ctx, Capability::UpdateTicketStatus) {
        return e;
    }
    let ticket = match find_visible_ticket(state.db(), &ctx, &public_id).await {
        Ok(ticket) => ticket,
        Err(response) => return response,
    };

    match ticket::Model::set_status(state.db(), ticket.id, req.status_id, ctx.staff.user_id).await {
        Ok(updated) => {
            notify_creator_update(state.db(), &updated, "Your ticket's status changed").await;
            emit::ticket_updated(&state, &updated);
            updated_response(&updated, "Status updated successfully")
        }
        Err(e) => domain_error_response(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct EscalateRequest {
    pub panel_id: i64,
}

/// POST /api/staff/tickets/{public_id}/escalate
///
/// Moves the ticket to a different active panel and clears the current
/// assignment, forcing re-triage there. The actor must be able to see the
/// target panel as well as the current one.
pub async fn escalate_ticket(
    State(state): State<AppState>,
    Extension(ctx): Extension<StaffContext>,
    Path(public_id): Path<String>,
    Json(req): Json<EscalateRequest>,
) -> Response {
    if let Err(e) = require(&ctx, Capability::EscalateTickets) {
        return e;
    }
    let ticket = match find_visible_ticket(state.db(), &ctx, &public_id).await {
        Ok(ticket) => ticket,
        Err(response) => return response,
    };

    let target_visible = match db::models::ticket_panel::Model::staff_can_access(
        state.db(),
        &ctx.role,
        req.panel_id,
    )
    .await
    {
        Ok(visible) => visible,
        Err(e) => return db_error_response(e),
    };
    if !target_visible {
        return (
            StatusCode::FORBIDDEN,
            Json(ApiResponse::<()>::error(
                "You do not have access to the target panel",
            )),
        )
            .into_response();
    }

    match ticket::Model::escalate(state.db(), ticket.id, req.panel_id, ctx.staff.user_id).await {
        Ok(updated) => {
            notify_creator_update(state.db(), &updated, "Your ticket was moved to another queue")
                .await;
            emit::ticket_updated(&state, &updated);
            updated_response(&updated, "Ticket escalated successfully")
        }
        Err(e) => domain_error_response(e),
    }
}

/// POST /api/staff/tickets/{public_id}/close
///
/// Transitions into the canonical closed status. The first close generates
/// an automatic transcript; re-closing never does.
///
/// ### Errors
/// - `409 Conflict` — no closed status is configured
pub async fn close_ticket(
    State(state): State<AppState>,
    Extension(ctx): Extension<StaffContext>,
    Path(public_id): Path<String>,
) -> Response {
    if let Err(e) = require(&ctx, Capability::CloseTickets) {
        return e;
    }
    let ticket = match find_visible_ticket(state.db(), &ctx, &public_id).await {
        Ok(ticket) => ticket,
        Err(response) => return response,
    };

    match ticket::Model::close(state.db(), ticket.id, ctx.staff.user_id).await {
        Ok(updated) => {
            notify_creator_update(state.db(), &updated, "Your ticket was closed").await;
            emit::ticket_updated(&state, &updated);
            updated_response(&updated, "Ticket closed successfully")
        }
        Err(e) => domain_error_response(e),
    }
}

/// POST /api/staff/tickets/{public_id}/transcripts
///
/// Requests a manual transcript snapshot. Always creates a new row,
/// regardless of ticket state.
pub async fn create_transcript(
    State(state): State<AppState>,
    Extension(ctx): Extension<StaffContext>,
    Path(public_id): Path<String>,
) -> Response {
    if let Err(e) = require(&ctx, Capability::GenerateTranscripts) {
        return e;
    }
    let ticket = match find_visible_ticket(state.db(), &ctx, &public_id).await {
        Ok(ticket) => ticket,
        Err(response) => return response,
    };

    match ticket_transcript::Model::generate(state.db(), ticket.id, TranscriptTrigger::Manual).await
    {
        Ok(transcript) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(
                serde_json::json!({
                    "id": transcript.id,
                    "trigger": transcript.trigger.to_string(),
                    "generated_at": transcript.generated_at.to_rfc3339(),
                }),
                "Transcript created successfully",
            )),
        )
            .into_response(),
        Err(e) => domain_error_response(e),
    }
}
