//! Shared helpers for tests: an in-memory database with migrations applied,
//! plus fixture builders for the common entities.

use migration::Migrator;
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use crate::models::{role, staff_member, ticket_panel, ticket_status, user};
use crate::permissions::CapabilitySet;

pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory db");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

pub async fn make_user(db: &DatabaseConnection, username: &str) -> user::Model {
    user::Model::create(db, None, username, Some(&format!("{username}@example.com")))
        .await
        .expect("failed to create user")
}

pub async fn make_role(
    db: &DatabaseConnection,
    name: &str,
    sort_order: Option<i32>,
    permissions: &CapabilitySet,
) -> role::Model {
    role::Model::create(db, name, sort_order, false, permissions, None)
        .await
        .expect("failed to create role")
}

pub async fn make_admin_role(db: &DatabaseConnection) -> role::Model {
    role::Model::create(db, "Admin", None, true, &CapabilitySet::All, None)
        .await
        .expect("failed to create admin role")
}

pub async fn make_staff(
    db: &DatabaseConnection,
    user: &user::Model,
    role: &role::Model,
    pay_per_ticket: i64,
) -> staff_member::Model {
    staff_member::Model::create(db, user.id, role.id, None, pay_per_ticket)
        .await
        .expect("failed to create staff member")
}

pub async fn make_panel(db: &DatabaseConnection, name: &str) -> ticket_panel::Model {
    ticket_panel::Model::create(db, name, true, 0)
        .await
        .expect("failed to create panel")
}

/// Seeds the standard pair of statuses: a default-open "Open" and a closed
/// "Closed".
pub async fn make_statuses(
    db: &DatabaseConnection,
) -> (ticket_status::Model, ticket_status::Model) {
    let open = ticket_status::Model::create(db, "Open", "open", true, false, 0)
        .await
        .expect("failed to create open status");
    let closed = ticket_status::Model::create(db, "Closed", "closed", false, true, 10)
        .await
        .expect("failed to create closed status");
    (open, closed)
}
