use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use sea_orm::QueryFilter;
use serde::Serialize;

/// Represents an end user in the `users` table.
///
/// Users are created on first login and never deleted; audit history keeps
/// referencing them after any staff record is gone.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// External identity id (e.g. a Discord user id). Absent for web-only users.
    pub identity_id: Option<String>,
    /// Display name.
    pub username: String,
    pub email: Option<String>,
    /// Whether the user wants ticket updates delivered over Discord DM.
    pub discord_dm_enabled: bool,
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
        identity_id: Option<&str>,
        username: &str,
        email: Option<&str>,
    ) -> Result<Model, DbErr> {
        let now = Utc::now();

        let active = ActiveModel {
            identity_id: Set(identity_id.map(str::to_owned)),
            username: Set(username.to_owned()),
            email: Set(email.map(str::to_owned)),
            discord_dm_enabled: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        active.insert(db).await
    }

    pub async fn find_by_identity(db: &DbConn, identity_id: &str) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::IdentityId.eq(identity_id))
            .one(db)
            .await
    }

    /// First-login create / profile-refresh update from a verified external
    /// profile delivered by the OAuth collaborator.
    pub async fn upsert_from_profile(
        db: &DbConn,
        identity_id: &str,
        username: &str,
        email: Option<&str>,
    ) -> Result<Model, DbErr> {
        match Self::find_by_identity(db, identity_id).await? {
            Some(existing) => {
                let mut active: ActiveModel = existing.into();
                active.username = Set(username.to_owned());
                if email.is_some() {
                    active.email = Set(email.map(str::to_owned));
                }
                active.updated_at = Set(Utc::now());
                active.update(db).await
            }
            None => Self::create(db, Some(identity_id), username, email).await,
        }
    }
}
