use axum::{
    Router,
    routing::{get, post},
};
use util::state::AppState;

pub mod common;
pub mod get;
pub mod post;

use get::{get_staff_ticket, get_transcript, list_staff_tickets, list_transcripts};
use post::{
    assign_ticket, claim_ticket, close_ticket, create_transcript, escalate_ticket, set_status,
    staff_reply, unclaim_ticket,
};

/// Builds the `/staff/tickets` route group: the triage queue and the full
/// lifecycle surface. Panel visibility is re-checked inside every handler.
pub fn staff_ticket_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_staff_tickets))
        .route("/{public_id}", get(get_staff_ticket))
        .route("/{public_id}/messages", post(staff_reply))
        .route("/{public_id}/claim", post(claim_ticket))
        .route("/{public_id}/unclaim", post(unclaim_ticket))
        .route("/{public_id}/assign", post(assign_ticket))
        .route("/{public_id}/status", post(set_status))
        .route("/{public_id}/escalate", post(escalate_ticket))
        .route("/{public_id}/close", post(close_ticket))
        .route(
            "/{public_id}/transcripts",
            get(list_transcripts).post(create_transcript),
        )
        .route("/{public_id}/transcripts/{transcript_id}", get(get_transcript))
}
