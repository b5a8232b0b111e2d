use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use sea_orm::{PaginatorTrait, QueryFilter, QueryOrder};
use serde::Serialize;

/// A named ticket intake category with an optional per-role visibility
/// allow-list (see `panel_role_access`).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "ticket_panels")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::panel_role_access::Entity")]
    PanelRoleAccess,
}

impl Related<super::panel_role_access::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PanelRoleAccess.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DbConn,
        name: &str,
        active: bool,
        sort_order: i32,
    ) -> Result<Model, DbErr> {
        let now = Utc::now();

        let active_model = ActiveModel {
            name: Set(name.to_owned()),
            active: Set(active),
            sort_order: Set(sort_order),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        active_model.insert(db).await
    }

    pub async fn find_by_id(db: &DbConn, panel_id: i64) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(panel_id).one(db).await
    }

    pub async fn list_active(db: &DbConn) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::Active.eq(true))
            .order_by_asc(Column::SortOrder)
            .order_by_asc(Column::Name)
            .all(db)
            .await
    }

    pub async fn list_all(db: &DbConn) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .order_by_asc(Column::SortOrder)
            .order_by_asc(Column::Name)
            .all(db)
            .await
    }

    /// Panel visibility check. Admins see every panel; a panel with no
    /// access-restriction rows is visible to all staff; otherwise a row for
    /// the staff member's role must exist.
    ///
    /// Deliberately re-evaluated on every request rather than cached: panel
    /// and role configuration can change between requests.
    pub async fn staff_can_access(
        db: &DbConn,
        role: &super::role::Model,
        panel_id: i64,
    ) -> Result<bool, DbErr> {
        if role.is_admin {
            return Ok(true);
        }
        let restricted = super::panel_role_access::Entity::find()
            .filter(super::panel_role_access::Column::PanelId.eq(panel_id))
            .count(db)
            .await?;
        if restricted == 0 {
            return Ok(true);
        }
        let matching = super::panel_role_access::Entity::find()
            .filter(super::panel_role_access::Column::PanelId.eq(panel_id))
            .filter(super::panel_role_access::Column::RoleId.eq(role.id))
            .count(db)
            .await?;
        Ok(matching > 0)
    }

    /// Active panels the staff member may see, ordered by (sort_order, name).
    pub async fn accessible_panels(
        db: &DbConn,
        role: &super::role::Model,
    ) -> Result<Vec<Model>, DbErr> {
        let panels = Self::list_active(db).await?;
        if role.is_admin {
            return Ok(panels);
        }

        let mut visible = Vec::with_capacity(panels.len());
        for panel in panels {
            if Self::staff_can_access(db, role, panel.id).await? {
                visible.push(panel);
            }
        }
        Ok(visible)
    }

    pub async fn update(
        db: &DbConn,
        panel_id: i64,
        name: Option<&str>,
        active: Option<bool>,
        sort_order: Option<i32>,
    ) -> Result<Model, DbErr> {
        let model = Entity::find_by_id(panel_id)
            .one(db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("Panel not found".to_string()))?;

        let mut active_model: ActiveModel = model.into();
        if let Some(name) = name {
            active_model.name = Set(name.to_owned());
        }
        if let Some(flag) = active {
            active_model.active = Set(flag);
        }
        if let Some(order) = sort_order {
            active_model.sort_order = Set(order);
        }
        active_model.updated_at = Set(Utc::now());
        active_model.update(db).await
    }

    pub async fn delete(db: &DbConn, panel_id: i64) -> Result<(), DbErr> {
        Entity::delete_by_id(panel_id).exec(db).await?;
        Ok(())
    }

    /// True if any ticket still references the panel.
    pub async fn is_referenced(db: &DbConn, panel_id: i64) -> Result<bool, DbErr> {
        let tickets = super::ticket::Entity::find()
            .filter(super::ticket::Column::PanelId.eq(panel_id))
            .count(db)
            .await?;
        Ok(tickets > 0)
    }
}
