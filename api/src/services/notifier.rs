//! Discord-bot collaborator boundary.
//!
//! Staff replies and status changes on discord-sourced tickets must also be
//! delivered externally; the bot itself lives outside this repository, so
//! handlers talk to it through `TicketNotifier`. Delivery is best-effort and
//! never fails the triggering operation.

use async_trait::async_trait;
use db::models::{ticket, user};

#[async_trait]
pub trait TicketNotifier: Send + Sync {
    /// Delivers a staff reply to the ticket creator over DM.
    async fn send_ticket_dm_reply(&self, creator: &user::Model, ticket: &ticket::Model, body: &str);

    /// Notifies the ticket creator of a lifecycle change (status, panel).
    async fn send_ticket_update_dm(&self, creator: &user::Model, ticket: &ticket::Model, summary: &str);

    /// Posts a message to the staff support channel.
    async fn send_support_channel_message(&self, text: &str);
}

/// Default notifier used when no bot is wired up: logs every delivery.
pub struct LoggingNotifier;

#[async_trait]
impl TicketNotifier for LoggingNotifier {
    async fn send_ticket_dm_reply(&self, creator: &user::Model, ticket: &ticket::Model, body: &str) {
        if !creator.discord_dm_enabled {
            return;
        }
        tracing::info!(
            user = creator.id,
            ticket = %ticket.public_id,
            len = body.len(),
            "would deliver ticket reply DM"
        );
    }

    async fn send_ticket_update_dm(&self, creator: &user::Model, ticket: &ticket::Model, summary: &str) {
        if !creator.discord_dm_enabled {
            return;
        }
        tracing::info!(
            user = creator.id,
            ticket = %ticket.public_id,
            summary,
            "would deliver ticket update DM"
        );
    }

    async fn send_support_channel_message(&self, text: &str) {
        tracing::info!(len = text.len(), "would post support channel message");
    }
}

static NOTIFIER: LoggingNotifier = LoggingNotifier;

/// The process-wide notifier instance.
pub fn notifier() -> &'static dyn TicketNotifier {
    &NOTIFIER
}
