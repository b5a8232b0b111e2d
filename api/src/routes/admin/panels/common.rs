use db::models::{panel_role_access, ticket_panel};
use sea_orm::{DbConn, DbErr};
use serde::Serialize;

#[derive(Serialize)]
pub struct PanelResponse {
    pub id: i64,
    pub name: String,
    pub active: bool,
    pub sort_order: i32,
    /// Allow-listed role ids; empty means the panel is visible to all staff.
    pub role_ids: Vec<i64>,
    pub created_at: String,
    pub updated_at: String,
}

impl PanelResponse {
    pub async fn load(db: &DbConn, panel: &ticket_panel::Model) -> Result<Self, DbErr> {
        let role_ids = panel_role_access::Model::roles_for_panel(db, panel.id).await?;
        Ok(Self {
            id: panel.id,
            name: panel.name.clone(),
            active: panel.active,
            sort_order: panel.sort_order,
            role_ids,
            created_at: panel.created_at.to_rfc3339(),
            updated_at: panel.updated_at.to_rfc3339(),
        })
    }
}
