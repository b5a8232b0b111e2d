use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use sea_orm::QueryFilter;
use serde::Serialize;

/// A capability-bearing staff actor: one user, one role, an `active` flag and
/// a per-ticket pay rate (in cents).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "staff_members")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub role_id: i64,
    pub active: bool,
    pub nickname: Option<String>,
    pub pay_per_ticket: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,

    #[sea_orm(
        belongs_to = "super::role::Entity",
        from = "Column::RoleId",
        to = "super::role::Column::Id"
    )]
    Role,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Role.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DbConn,
        user_id: i64,
        role_id: i64,
        nickname: Option<&str>,
        pay_per_ticket: i64,
    ) -> Result<Model, DbErr> {
        let now = Utc::now();

        let active = ActiveModel {
            user_id: Set(user_id),
            role_id: Set(role_id),
            active: Set(true),
            nickname: Set(nickname.map(str::to_owned)),
            pay_per_ticket: Set(pay_per_ticket),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        active.insert(db).await
    }

    pub async fn find_by_id(db: &DbConn, staff_id: i64) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(staff_id).one(db).await
    }

    pub async fn find_by_user_id(db: &DbConn, user_id: i64) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::UserId.eq(user_id))
            .one(db)
            .await
    }

    /// Loads a staff member together with its role.
    pub async fn find_with_role(
        db: &DbConn,
        staff_id: i64,
    ) -> Result<Option<(Model, super::role::Model)>, DbErr> {
        let pair = Entity::find_by_id(staff_id)
            .find_also_related(super::role::Entity)
            .one(db)
            .await?;
        Ok(pair.and_then(|(staff, role)| role.map(|r| (staff, r))))
    }

    /// Resolves the active staff record (with role) behind a user id, if any.
    pub async fn find_active_by_user_id(
        db: &DbConn,
        user_id: i64,
    ) -> Result<Option<(Model, super::role::Model)>, DbErr> {
        let pair = Entity::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::Active.eq(true))
            .find_also_related(super::role::Entity)
            .one(db)
            .await?;
        Ok(pair.and_then(|(staff, role)| role.map(|r| (staff, r))))
    }

    pub async fn list_all(db: &DbConn) -> Result<Vec<(Model, Option<super::role::Model>)>, DbErr> {
        Entity::find()
            .find_also_related(super::role::Entity)
            .all(db)
            .await
    }

    pub async fn set_role(db: &DbConn, staff_id: i64, role_id: i64) -> Result<Model, DbErr> {
        let model = Entity::find_by_id(staff_id)
            .one(db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("Staff member not found".to_string()))?;

        let mut active: ActiveModel = model.into();
        active.role_id = Set(role_id);
        active.updated_at = Set(Utc::now());
        active.update(db).await
    }

    pub async fn set_nickname(
        db: &DbConn,
        staff_id: i64,
        nickname: Option<&str>,
    ) -> Result<Model, DbErr> {
        let model = Entity::find_by_id(staff_id)
            .one(db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("Staff member not found".to_string()))?;

        let mut active: ActiveModel = model.into();
        active.nickname = Set(nickname.map(str::to_owned));
        active.updated_at = Set(Utc::now());
        active.update(db).await
    }

    pub async fn set_pay_rate(db: &DbConn, staff_id: i64, pay_per_ticket: i64) -> Result<Model, DbErr> {
        let model = Entity::find_by_id(staff_id)
            .one(db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("Staff member not found".to_string()))?;

        let mut active: ActiveModel = model.into();
        active.pay_per_ticket = Set(pay_per_ticket);
        active.updated_at = Set(Utc::now());
        active.update(db).await
    }

    /// Activates or deactivates a staff member.
    ///
    /// Deactivation revokes authorization immediately and unassigns every
    /// ticket currently held by the member.
    pub async fn set_active(db: &DbConn, staff_id: i64, active_flag: bool) -> Result<Model, DbErr> {
        let model = Entity::find_by_id(staff_id)
            .one(db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("Staff member not found".to_string()))?;

        let mut active: ActiveModel = model.into();
        active.active = Set(active_flag);
        active.updated_at = Set(Utc::now());
        let updated = active.update(db).await?;

        if !active_flag {
            super::ticket::Model::unassign_all_for_staff(db, staff_id).await?;
        }

        Ok(updated)
    }
}
