use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use sea_orm::QueryFilter;
use serde::Serialize;

/// Allow-list rows restricting a panel to specific roles. No rows for a
/// panel means the panel is visible to all staff.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "panel_role_access")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub panel_id: i64,

    #[sea_orm(primary_key, auto_increment = false)]
    pub role_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ticket_panel::Entity",
        from = "Column::PanelId",
        to = "super::ticket_panel::Column::Id"
    )]
    Panel,

    #[sea_orm(
        belongs_to = "super::role::Entity",
        from = "Column::RoleId",
        to = "super::role::Column::Id"
    )]
    Role,
}

impl Related<super::ticket_panel::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Panel.def()
    }
}

impl Related<super::role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Role.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn roles_for_panel(db: &DbConn, panel_id: i64) -> Result<Vec<i64>, DbErr> {
        let rows = Entity::find()
            .filter(Column::PanelId.eq(panel_id))
            .all(db)
            .await?;
        Ok(rows.into_iter().map(|r| r.role_id).collect())
    }

    /// Replaces the allow-list for a panel. An empty list removes the
    /// restriction entirely.
    pub async fn set_for_panel(
        db: &DbConn,
        panel_id: i64,
        role_ids: &[i64],
    ) -> Result<(), DbErr> {
        Entity::delete_many()
            .filter(Column::PanelId.eq(panel_id))
            .exec(db)
            .await?;

        for role_id in role_ids {
            let row = ActiveModel {
                panel_id: Set(panel_id),
                role_id: Set(*role_id),
            };
            row.insert(db).await?;
        }
        Ok(())
    }
}
