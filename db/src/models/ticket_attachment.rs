use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use sea_orm::QueryFilter;
use serde::{Deserialize, Serialize};

/// A file attached to a ticket message. The blob itself lives in the
/// attachment store; this row carries the storage locator.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "ticket_attachments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub message_id: i64,

    pub filename: String,
    pub storage_key: String,
    pub mime: String,
    pub size_bytes: i64,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ticket_message::Entity",
        from = "Column::MessageId",
        to = "super::ticket_message::Column::Id"
    )]
    Message,
}

impl Related<super::ticket_message::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Message.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DbConn,
        message_id: i64,
        filename: &str,
        storage_key: &str,
        mime: &str,
        size_bytes: i64,
    ) -> Result<Model, DbErr> {
        let active = ActiveModel {
            message_id: Set(message_id),
            filename: Set(filename.to_owned()),
            storage_key: Set(storage_key.to_owned()),
            mime: Set(mime.to_owned()),
            size_bytes: Set(size_bytes),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        active.insert(db).await
    }

    pub async fn find_by_id(db: &DbConn, attachment_id: i64) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(attachment_id).one(db).await
    }

    pub async fn find_for_message(db: &DbConn, message_id: i64) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::MessageId.eq(message_id))
            .all(db)
            .await
    }

    pub async fn find_for_messages(db: &DbConn, message_ids: &[i64]) -> Result<Vec<Model>, DbErr> {
        if message_ids.is_empty() {
            return Ok(vec![]);
        }
        Entity::find()
            .filter(Column::MessageId.is_in(message_ids.to_vec()))
            .all(db)
            .await
    }
}
