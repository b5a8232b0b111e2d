use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use db::models::{ticket, ticket_claim, ticket_panel, ticket_transcript};
use db::permissions::Capability;
use serde::{Deserialize, Serialize};
use util::state::AppState;

use crate::auth::claims::StaffContext;
use crate::auth::guards::{Empty, require_capability};
use crate::response::ApiResponse;
use crate::routes::common::{
    ClaimResponse, TicketDetailResponse, TicketResponse, db_error_response, load_messages,
};
use crate::services::transcript::render_html;

use super::common::find_visible_ticket;

#[derive(Debug, Deserialize)]
pub struct QueueQuery {
    pub status_id: Option<i64>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Serialize)]
pub struct QueueResponse {
    pub tickets: Vec<TicketResponse>,
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
}

/// GET /api/staff/tickets
///
/// The triage queue: tickets in every panel the acting member may see,
/// newest activity first, optionally filtered by status.
pub async fn list_staff_tickets(
    State(state): State<AppState>,
    Extension(ctx): Extension<StaffContext>,
    Query(query): Query<QueueQuery>,
) -> Response {
    if let Err(e) = require_capability(&ctx, Capability::ViewTickets) {
        return e.into_response();
    }

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let panels = match ticket_panel::Model::accessible_panels(state.db(), &ctx.role).await {
        Ok(panels) => panels,
        Err(e) => return db_error_response(e),
    };
    let panel_ids: Vec<i64> = panels.iter().map(|p| p.id).collect();

    match ticket::Model::list_for_panels(state.db(), &panel_ids, query.status_id, page, per_page)
        .await
    {
        Ok((tickets, total)) => {
            let views: Vec<TicketResponse> = tickets.iter().map(TicketResponse::from).collect();
            Json(ApiResponse::success(
                QueueResponse {
                    tickets: views,
                    page,
                    per_page,
                    total,
                },
                "Tickets retrieved successfully",
            ))
            .into_response()
        }
        Err(e) => db_error_response(e),
    }
}

#[derive(Serialize)]
pub struct StaffTicketDetailResponse {
    #[serde(flatten)]
    pub detail: TicketDetailResponse,
    pub claims: Vec<ClaimResponse>,
}

/// GET /api/staff/tickets/{public_id}
///
/// Full ticket detail for staff: messages with attachments plus the
/// append-only claim history.
pub async fn get_staff_ticket(
    State(state): State<AppState>,
    Extension(ctx): Extension<StaffContext>,
    Path(public_id): Path<String>,
) -> Response {
    if let Err(e) = require_capability(&ctx, Capability::ViewTickets) {
        return e.into_response();
    }

    let ticket = match find_visible_ticket(state.db(), &ctx, &public_id).await {
        Ok(ticket) => ticket,
        Err(response) => return response,
    };

    let messages = match load_messages(state.db(), ticket.id).await {
        Ok(messages) => messages,
        Err(e) => return db_error_response(e),
    };

    let claims = match ticket_claim::Model::history_for_ticket(state.db(), ticket.id).await {
        Ok(claims) => claims.iter().map(ClaimResponse::from).collect(),
        Err(e) => return db_error_response(e),
    };

    Json(ApiResponse::success(
        StaffTicketDetailResponse {
            detail: TicketDetailResponse {
                ticket: TicketResponse::from(&ticket),
                messages,
            },
            claims,
        },
        "Ticket retrieved successfully",
    ))
    .into_response()
}

#[derive(Serialize)]
pub struct TranscriptSummary {
    pub id: i64,
    pub trigger: String,
    pub generated_at: String,
}

/// GET /api/staff/tickets/{public_id}/transcripts
pub async fn list_transcripts(
    State(state): State<AppState>,
    Extension(ctx): Extension<StaffContext>,
    Path(public_id): Path<String>,
) -> Response {
    if let Err(e) = require_capability(&ctx, Capability::ViewTickets) {
        return e.into_response();
    }

    let ticket = match find_visible_ticket(state.db(), &ctx, &public_id).await {
        Ok(ticket) => ticket,
        Err(response) => return response,
    };

    match ticket_transcript::Model::find_for_ticket(state.db(), ticket.id).await {
        Ok(transcripts) => {
            let views: Vec<TranscriptSummary> = transcripts
                .iter()
                .map(|t| TranscriptSummary {
                    id: t.id,
                    trigger: t.trigger.to_string(),
                    generated_at: t.generated_at.to_rfc3339(),
                })
                .collect();
            Json(ApiResponse::success(views, "Transcripts retrieved successfully")).into_response()
        }
        Err(e) => db_error_response(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct TranscriptQuery {
    pub format: Option<String>,
}

/// GET /api/staff/tickets/{public_id}/transcripts/{transcript_id}?format=html|json
///
/// Returns a stored snapshot either verbatim as structured data (default)
/// or rendered as a portable HTML document. Every interpolated field in the
/// HTML rendering is escaped.
pub async fn get_transcript(
    State(state): State<AppState>,
    Extension(ctx): Extension<StaffContext>,
    Path((public_id, transcript_id)): Path<(String, i64)>,
    Query(query): Query<TranscriptQuery>,
) -> Response {
    if let Err(e) = require_capability(&ctx, Capability::ViewTickets) {
        return e.into_response();
    }

    let ticket = match find_visible_ticket(state.db(), &ctx, &public_id).await {
        Ok(ticket) => ticket,
        Err(response) => return response,
    };

    let transcript = match ticket_transcript::Model::find_by_id(state.db(), transcript_id).await {
        Ok(Some(t)) if t.ticket_id == ticket.id => t,
        Ok(_) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<Empty>::error("Transcript not found")),
            )
                .into_response();
        }
        Err(e) => return db_error_response(e),
    };

    let snapshot: serde_json::Value =
        serde_json::from_str(&transcript.snapshot).unwrap_or(serde_json::Value::Null);

    match query.format.as_deref() {
        Some("html") => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            render_html(&snapshot),
        )
            .into_response(),
        _ => Json(ApiResponse::success(snapshot, "Transcript retrieved successfully"))
            .into_response(),
    }
}
