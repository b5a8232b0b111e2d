//! One-liner emit helpers used by route handlers after a successful
//! mutation. Publishing is fire-and-forget; subscribers re-fetch
//! authoritative state themselves.

use db::models::ticket;
use util::events::{TicketEvent, TicketEventKind};
use util::state::AppState;

pub fn ticket_created(state: &AppState, ticket: &ticket::Model) {
    state.events().publish(&TicketEvent::new(
        TicketEventKind::TicketCreated,
        &ticket.public_id,
        ticket.creator_user_id,
    ));
}

pub fn ticket_message(state: &AppState, ticket: &ticket::Model) {
    state.events().publish(&TicketEvent::new(
        TicketEventKind::TicketMessage,
        &ticket.public_id,
        ticket.creator_user_id,
    ));
}

pub fn ticket_updated(state: &AppState, ticket: &ticket::Model) {
    state.events().publish(&TicketEvent::new(
        TicketEventKind::TicketUpdated,
        &ticket.public_id,
        ticket.creator_user_id,
    ));
}
