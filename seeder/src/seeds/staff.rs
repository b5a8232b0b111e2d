use crate::seed::Seeder;
use db::models::{role, staff_member, user};
use sea_orm::DatabaseConnection;

pub struct StaffSeeder;

/// Bootstraps one admin staff member so a fresh deployment has someone who
/// can configure the rest.
#[async_trait::async_trait]
impl Seeder for StaffSeeder {
    async fn seed(&self, db: &DatabaseConnection) {
        let admin_role = role::Model::list_all(db)
            .await
            .expect("failed to list roles")
            .into_iter()
            .find(|r| r.is_admin)
            .expect("admin role must be seeded first");

        let admin_user = user::Model::upsert_from_profile(
            db,
            "000000000000000000",
            "admin",
            Some("admin@example.com"),
        )
        .await
        .expect("failed to seed admin user");

        let existing = staff_member::Model::find_by_user_id(db, admin_user.id)
            .await
            .expect("failed to check admin staff");
        if existing.is_none() {
            staff_member::Model::create(db, admin_user.id, admin_role.id, None, 0)
                .await
                .expect("failed to seed admin staff member");
        }
    }
}
