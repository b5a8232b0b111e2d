use crate::seed::Seeder;
use db::models::ticket_panel::Model;
use sea_orm::DatabaseConnection;

pub struct PanelSeeder;

#[async_trait::async_trait]
impl Seeder for PanelSeeder {
    async fn seed(&self, db: &DatabaseConnection) {
        let existing = Model::list_all(db).await.expect("failed to list panels");
        if !existing.is_empty() {
            return;
        }

        Model::create(db, "General Support", true, 0)
            .await
            .expect("failed to seed General Support panel");
        Model::create(db, "Billing", true, 5)
            .await
            .expect("failed to seed Billing panel");
        Model::create(db, "Technical", true, 10)
            .await
            .expect("failed to seed Technical panel");
    }
}
