use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use sea_orm::{PaginatorTrait, QueryFilter, QueryOrder};
use serde::Serialize;

use crate::permissions::{CapabilitySet, Rank, rank_of};

/// A staff role: name, seniority (`sort_order`, lower = more senior), and a
/// permission set stored as JSON text (`"*"` wildcard or an array of
/// capability strings). The `is_admin` flag marks the implicit top rank.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "roles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub sort_order: Option<i32>,
    pub is_admin: bool,
    pub permissions: String,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::staff_member::Entity")]
    StaffMember,
}

impl Related<super::staff_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StaffMember.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DbConn,
        name: &str,
        sort_order: Option<i32>,
        is_admin: bool,
        permissions: &CapabilitySet,
        color: Option<&str>,
    ) -> Result<Model, DbErr> {
        let now = Utc::now();

        let active = ActiveModel {
            name: Set(name.to_owned()),
            sort_order: Set(sort_order),
            is_admin: Set(is_admin),
            permissions: Set(permissions.to_json()),
            color: Set(color.map(str::to_owned)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        active.insert(db).await
    }

    pub async fn update(
        db: &DbConn,
        role_id: i64,
        name: Option<&str>,
        sort_order: Option<i32>,
        permissions: Option<&CapabilitySet>,
        color: Option<&str>,
        is_admin: Option<bool>,
    ) -> Result<Model, DbErr> {
        let model = Entity::find_by_id(role_id)
            .one(db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("Role not found".to_string()))?;

        let mut active: ActiveModel = model.into();
        if let Some(name) = name {
            active.name = Set(name.to_owned());
        }
        if let Some(order) = sort_order {
            active.sort_order = Set(Some(order));
        }
        if let Some(permissions) = permissions {
            active.permissions = Set(permissions.to_json());
        }
        if let Some(color) = color {
            active.color = Set(Some(color.to_owned()));
        }
        if let Some(flag) = is_admin {
            active.is_admin = Set(flag);
        }
        active.updated_at = Set(Utc::now());
        active.update(db).await
    }

    pub async fn list_all(db: &DbConn) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .order_by_asc(Column::SortOrder)
            .order_by_asc(Column::Name)
            .all(db)
            .await
    }

    pub async fn find_by_id(db: &DbConn, role_id: i64) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(role_id).one(db).await
    }

    /// True if any staff member or panel access row still references the role.
    pub async fn is_referenced(db: &DbConn, role_id: i64) -> Result<bool, DbErr> {
        let staff = super::staff_member::Entity::find()
            .filter(super::staff_member::Column::RoleId.eq(role_id))
            .count(db)
            .await?;
        if staff > 0 {
            return Ok(true);
        }
        let panels = super::panel_role_access::Entity::find()
            .filter(super::panel_role_access::Column::RoleId.eq(role_id))
            .count(db)
            .await?;
        Ok(panels > 0)
    }

    pub async fn delete(db: &DbConn, role_id: i64) -> Result<(), DbErr> {
        Entity::delete_by_id(role_id).exec(db).await?;
        Ok(())
    }

    pub fn rank(&self) -> Rank {
        rank_of(self)
    }

    pub fn capability_set(&self) -> CapabilitySet {
        CapabilitySet::parse(&self.permissions)
    }
}
