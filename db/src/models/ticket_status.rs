use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::Expr;
use sea_orm::{QueryFilter, QueryOrder, TransactionTrait};
use serde::Serialize;

/// A configurable ticket status. At steady state exactly one row carries
/// `is_default_open`; setting the flag clears it elsewhere in the same
/// transaction.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "ticket_statuses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub is_default_open: bool,
    pub is_closed: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        panic!("No RelationDef implemented")
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DbConn,
        name: &str,
        slug: &str,
        is_default_open: bool,
        is_closed: bool,
        sort_order: i32,
    ) -> Result<Model, DbErr> {
        let now = Utc::now();

        let txn = db.begin().await?;
        if is_default_open {
            Self::clear_default_open(&txn).await?;
        }

        let active = ActiveModel {
            name: Set(name.to_owned()),
            slug: Set(slug.to_owned()),
            is_default_open: Set(is_default_open),
            is_closed: Set(is_closed),
            sort_order: Set(sort_order),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let created = active.insert(&txn).await?;
        txn.commit().await?;
        Ok(created)
    }

    pub async fn update(
        db: &DbConn,
        status_id: i64,
        name: Option<&str>,
        is_default_open: Option<bool>,
        is_closed: Option<bool>,
        sort_order: Option<i32>,
    ) -> Result<Model, DbErr> {
        let txn = db.begin().await?;

        let model = Entity::find_by_id(status_id)
            .one(&txn)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("Ticket status not found".to_string()))?;

        if is_default_open == Some(true) {
            Self::clear_default_open(&txn).await?;
        }

        let mut active: ActiveModel = model.into();
        if let Some(name) = name {
            active.name = Set(name.to_owned());
        }
        if let Some(flag) = is_default_open {
            active.is_default_open = Set(flag);
        }
        if let Some(flag) = is_closed {
            active.is_closed = Set(flag);
        }
        if let Some(order) = sort_order {
            active.sort_order = Set(order);
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&txn).await?;
        txn.commit().await?;
        Ok(updated)
    }

    async fn clear_default_open<C: ConnectionTrait>(conn: &C) -> Result<(), DbErr> {
        Entity::update_many()
            .col_expr(Column::IsDefaultOpen, Expr::value(false))
            .filter(Column::IsDefaultOpen.eq(true))
            .exec(conn)
            .await?;
        Ok(())
    }

    pub async fn find_by_id(db: &DbConn, status_id: i64) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(status_id).one(db).await
    }

    pub async fn list_all(db: &DbConn) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .order_by_asc(Column::SortOrder)
            .order_by_asc(Column::Id)
            .all(db)
            .await
    }

    /// The status new tickets start in: the row flagged `is_default_open`,
    /// falling back to the lowest-id status when none is flagged.
    pub async fn find_default_open(db: &DbConn) -> Result<Option<Model>, DbErr> {
        if let Some(flagged) = Entity::find()
            .filter(Column::IsDefaultOpen.eq(true))
            .one(db)
            .await?
        {
            return Ok(Some(flagged));
        }
        Entity::find().order_by_asc(Column::Id).one(db).await
    }

    /// The canonical closed status: the most senior (lowest sort_order) row
    /// flagged `is_closed`.
    pub async fn find_canonical_closed(db: &DbConn) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::IsClosed.eq(true))
            .order_by_asc(Column::SortOrder)
            .order_by_asc(Column::Id)
            .one(db)
            .await
    }

    pub async fn delete(db: &DbConn, status_id: i64) -> Result<(), DbErr> {
        Entity::delete_by_id(status_id).exec(db).await?;
        Ok(())
    }

    /// True if any ticket still references the status.
    pub async fn is_referenced(db: &DbConn, status_id: i64) -> Result<bool, DbErr> {
        use sea_orm::PaginatorTrait;
        let tickets = super::ticket::Entity::find()
            .filter(super::ticket::Column::StatusId.eq(status_id))
            .count(db)
            .await?;
        Ok(tickets > 0)
    }
}
