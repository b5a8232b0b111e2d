use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use sea_orm::{QueryFilter, QueryOrder};
use serde::Serialize;
use serde_json::json;
use strum::{Display, EnumString};

use crate::error::{DomainError, DomainResult};
use super::{audit_log, ticket, ticket_attachment, ticket_claim, ticket_message};

/// An immutable point-in-time snapshot of a ticket's full history.
///
/// Generated exactly once automatically on first close and any number of
/// times on manual request. The snapshot is stored as JSON text and rendered
/// on demand; it is never updated after insertion.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "ticket_transcripts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub ticket_id: i64,
    pub trigger: TranscriptTrigger,
    pub snapshot: String,

    pub generated_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transcript_trigger")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptTrigger {
    #[sea_orm(string_value = "close")]
    Close,

    #[sea_orm(string_value = "manual")]
    Manual,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ticket::Entity",
        from = "Column::TicketId",
        to = "super::ticket::Column::Id"
    )]
    Ticket,
}

impl Related<super::ticket::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ticket.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Current snapshot schema version.
pub const SCHEMA_VERSION: u32 = 1;

impl Model {
    /// Builds and persists a snapshot of the ticket as it stands right now:
    /// the ticket row, messages in creation order with their attachments,
    /// claim history and audit entries in time order.
    pub async fn generate(
        db: &DbConn,
        ticket_id: i64,
        trigger: TranscriptTrigger,
    ) -> DomainResult<Model> {
        let ticket = ticket::Model::find_by_id(db, ticket_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Ticket not found"))?;

        let messages = ticket_message::Model::find_all_for_ticket(db, ticket_id).await?;
        let message_ids: Vec<i64> = messages.iter().map(|m| m.id).collect();
        let attachments = ticket_attachment::Model::find_for_messages(db, &message_ids).await?;
        let claims = ticket_claim::Model::history_for_ticket(db, ticket_id).await?;
        let audit = audit_log::Model::find_for_entity(db, "ticket", ticket_id).await?;

        let generated_at = Utc::now();

        let message_values: Vec<serde_json::Value> = messages
            .iter()
            .map(|m| {
                let atts: Vec<&ticket_attachment::Model> = attachments
                    .iter()
                    .filter(|a| a.message_id == m.id)
                    .collect();
                let mut value = serde_json::to_value(m).unwrap_or_else(|_| json!({}));
                value["attachments"] = serde_json::to_value(atts).unwrap_or_else(|_| json!([]));
                value
            })
            .collect();

        let snapshot = json!({
            "schema_version": SCHEMA_VERSION,
            "generated_at": generated_at.to_rfc3339(),
            "ticket": ticket,
            "messages": message_values,
            "claims": claims,
            "audit": audit,
        });

        let active = ActiveModel {
            ticket_id: Set(ticket_id),
            trigger: Set(trigger),
            snapshot: Set(snapshot.to_string()),
            generated_at: Set(generated_at),
            ..Default::default()
        };

        Ok(active.insert(db).await?)
    }

    pub async fn find_by_id(db: &DbConn, transcript_id: i64) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(transcript_id).one(db).await
    }

    pub async fn find_for_ticket(db: &DbConn, ticket_id: i64) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::TicketId.eq(ticket_id))
            .order_by_asc(Column::GeneratedAt)
            .order_by_asc(Column::Id)
            .all(db)
            .await
    }
}
