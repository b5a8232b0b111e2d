use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use sea_orm::{QueryFilter, QueryOrder, QuerySelect};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::ticket::TicketSource;

/// A single message on a ticket. Immutable once created.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "ticket_messages")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub ticket_id: i64,
    pub author_user_id: i64,
    pub author_type: AuthorType,

    pub body: String,
    pub source: TicketSource,
    pub parent_id: Option<i64>,

    pub created_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "ticket_author_type")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AuthorType {
    #[sea_orm(string_value = "user")]
    User,

    #[sea_orm(string_value = "staff")]
    Staff,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ticket::Entity",
        from = "Column::TicketId",
        to = "super::ticket::Column::Id"
    )]
    Ticket,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorUserId",
        to = "super::user::Column::Id"
    )]
    Author,

    #[sea_orm(has_many = "super::ticket_attachment::Entity")]
    Attachment,
}

impl Related<super::ticket::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ticket.def()
    }
}

impl Related<super::ticket_attachment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attachment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DbConn,
        ticket_id: i64,
        author_user_id: i64,
        author_type: AuthorType,
        body: &str,
        source: TicketSource,
        parent_id: Option<i64>,
    ) -> Result<Model, DbErr> {
        let active = ActiveModel {
            ticket_id: Set(ticket_id),
            author_user_id: Set(author_user_id),
            author_type: Set(author_type),
            body: Set(body.to_owned()),
            source: Set(source),
            parent_id: Set(parent_id),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        active.insert(db).await
    }

    pub async fn find_by_id(db: &DbConn, message_id: i64) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(message_id).one(db).await
    }

    pub async fn find_all_for_ticket(db: &DbConn, ticket_id: i64) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::TicketId.eq(ticket_id))
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .all(db)
            .await
    }

    /// Distinct tickets a staff author replied to in the given time range.
    pub async fn distinct_tickets_replied(
        db: &DbConn,
        author_user_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<u64, DbErr> {
        let ids: Vec<i64> = Entity::find()
            .select_only()
            .column(Column::TicketId)
            .distinct()
            .filter(Column::AuthorUserId.eq(author_user_id))
            .filter(Column::AuthorType.eq(AuthorType::Staff))
            .filter(Column::CreatedAt.gte(from))
            .filter(Column::CreatedAt.lt(to))
            .into_tuple()
            .all(db)
            .await?;
        Ok(ids.len() as u64)
    }
}
