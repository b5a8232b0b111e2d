use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use sea_orm::{PaginatorTrait, QueryFilter, QueryOrder};
use serde::Serialize;

/// Append-only audit trail. Rows are never updated or deleted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "audit_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Acting user; `None` for system actions.
    pub actor_user_id: Option<i64>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: i64,
    pub metadata: Option<String>,

    pub created_at: DateTime<Utc>,
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
    /// Appends an audit entry. Failures are logged and swallowed so they
    /// never abort the mutation being audited; losing a forensic row is
    /// preferable to failing the operation.
    pub async fn record(
        db: &DbConn,
        actor_user_id: Option<i64>,
        action: &str,
        entity_type: &str,
        entity_id: i64,
        metadata: Option<serde_json::Value>,
    ) {
        let active = ActiveModel {
            actor_user_id: Set(actor_user_id),
            action: Set(action.to_owned()),
            entity_type: Set(entity_type.to_owned()),
            entity_id: Set(entity_id),
            metadata: Set(metadata.map(|m| m.to_string())),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        if let Err(e) = active.insert(db).await {
            tracing::warn!(
                error = %e,
                action,
                entity_type,
                entity_id,
                "failed to write audit log entry"
            );
        }
    }

    pub async fn find_for_entity(
        db: &DbConn,
        entity_type: &str,
        entity_id: i64,
    ) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::EntityType.eq(entity_type))
            .filter(Column::EntityId.eq(entity_id))
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .all(db)
            .await
    }

    /// Newest-first page of the full trail, for the admin view.
    pub async fn list_page(
        db: &DbConn,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<Model>, u64), DbErr> {
        let paginator = Entity::find()
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .paginate(db, per_page);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }
}
