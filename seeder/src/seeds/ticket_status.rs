use crate::seed::Seeder;
use db::models::ticket_status::Model;
use sea_orm::DatabaseConnection;

pub struct StatusSeeder;

#[async_trait::async_trait]
impl Seeder for StatusSeeder {
    async fn seed(&self, db: &DatabaseConnection) {
        let existing = Model::list_all(db).await.expect("failed to list statuses");
        if !existing.is_empty() {
            return;
        }

        Model::create(db, "Open", "open", true, false, 0)
            .await
            .expect("failed to seed Open status");
        Model::create(db, "Pending", "pending", false, false, 5)
            .await
            .expect("failed to seed Pending status");
        Model::create(db, "Closed", "closed", false, true, 10)
            .await
            .expect("failed to seed Closed status");
    }
}
