pub mod broker;
pub use broker::{EventBroker, EventFilter, Subscription};

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Lifecycle event kinds published on the broker.
///
/// The string forms double as the SSE `event:` field, so they are stable
/// wire names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketEventKind {
    #[serde(rename = "ticket.created")]
    TicketCreated,
    #[serde(rename = "ticket.message")]
    TicketMessage,
    #[serde(rename = "ticket.updated")]
    TicketUpdated,
}

impl TicketEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketEventKind::TicketCreated => "ticket.created",
            TicketEventKind::TicketMessage => "ticket.message",
            TicketEventKind::TicketUpdated => "ticket.updated",
        }
    }
}

/// A ticket lifecycle notification.
///
/// Carries just enough for a subscriber to decide visibility and re-fetch
/// authoritative state; the broker is a notification layer, not a source of
/// truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketEvent {
    pub kind: TicketEventKind,
    pub ticket_public_id: String,
    pub creator_user_id: i64,
    pub ts: String,
}

impl TicketEvent {
    pub fn new(kind: TicketEventKind, ticket_public_id: impl Into<String>, creator_user_id: i64) -> Self {
        Self {
            kind,
            ticket_public_id: ticket_public_id.into(),
            creator_user_id,
            ts: Utc::now().to_rfc3339(),
        }
    }
}
