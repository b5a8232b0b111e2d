use sea_orm_migration::MigratorTrait;

use crate::seed::{Seeder, run_seeder};
use crate::seeds::{
    role::RoleSeeder, staff::StaffSeeder, ticket_panel::PanelSeeder, ticket_status::StatusSeeder,
};

mod seed;
mod seeds;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let db = db::connect().await;

    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run database migrations");

    for (seeder, name) in [
        (Box::new(StatusSeeder) as Box<dyn Seeder + Send + Sync>, "TicketStatus"),
        (Box::new(PanelSeeder), "TicketPanel"),
        (Box::new(RoleSeeder), "Role"),
        (Box::new(StaffSeeder), "Staff"),
    ] {
        run_seeder(&*seeder, name, &db).await;
    }
}
