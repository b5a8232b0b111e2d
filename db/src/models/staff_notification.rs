use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use sea_orm::{QueryFilter, QueryOrder};
use serde::Serialize;

use crate::error::{DomainError, DomainResult};

/// A small per-staff inbox (pay changes and similar), drained by the staff
/// client.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "staff_notifications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub staff_id: i64,
    /// Notification type, e.g. `pay.bonus`, `pay.dock`, `pay.rate`.
    pub kind: String,
    pub message: String,
    pub metadata: Option<String>,
    pub read_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::staff_member::Entity",
        from = "Column::StaffId",
        to = "super::staff_member::Column::Id"
    )]
    Staff,
}

impl Related<super::staff_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Staff.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DbConn,
        staff_id: i64,
        kind: &str,
        message: &str,
        metadata: Option<serde_json::Value>,
    ) -> Result<Model, DbErr> {
        let active = ActiveModel {
            staff_id: Set(staff_id),
            kind: Set(kind.to_owned()),
            message: Set(message.to_owned()),
            metadata: Set(metadata.map(|m| m.to_string())),
            read_at: Set(None),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        active.insert(db).await
    }

    pub async fn list_for_staff(
        db: &DbConn,
        staff_id: i64,
        unread_only: bool,
    ) -> Result<Vec<Model>, DbErr> {
        let mut query = Entity::find().filter(Column::StaffId.eq(staff_id));
        if unread_only {
            query = query.filter(Column::ReadAt.is_null());
        }
        query
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(db)
            .await
    }

    /// Marks one notification as read. The row must belong to the staff
    /// member doing the reading.
    pub async fn mark_read(
        db: &DbConn,
        staff_id: i64,
        notification_id: i64,
    ) -> DomainResult<Model> {
        let model = Entity::find_by_id(notification_id)
            .filter(Column::StaffId.eq(staff_id))
            .one(db)
            .await?
            .ok_or_else(|| DomainError::not_found("Notification not found"))?;

        if model.read_at.is_some() {
            return Ok(model);
        }

        let mut active: ActiveModel = model.into();
        active.read_at = Set(Some(Utc::now()));
        Ok(active.update(db).await?)
    }

    pub async fn mark_all_read(db: &DbConn, staff_id: i64) -> Result<(), DbErr> {
        use sea_orm::sea_query::Expr;
        Entity::update_many()
            .col_expr(Column::ReadAt, Expr::value(Some(Utc::now())))
            .filter(Column::StaffId.eq(staff_id))
            .filter(Column::ReadAt.is_null())
            .exec(db)
            .await?;
        Ok(())
    }
}
