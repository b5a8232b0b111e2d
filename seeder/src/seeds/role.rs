use crate::seed::Seeder;
use db::models::role::Model;
use db::permissions::{Capability, CapabilitySet};
use sea_orm::DatabaseConnection;

pub struct RoleSeeder;

#[async_trait::async_trait]
impl Seeder for RoleSeeder {
    async fn seed(&self, db: &DatabaseConnection) {
        let existing = Model::list_all(db).await.expect("failed to list roles");
        if !existing.is_empty() {
            return;
        }

        Model::create(db, "Admin", None, true, &CapabilitySet::All, Some("#d83c3e"))
            .await
            .expect("failed to seed Admin role");

        let manager = CapabilitySet::from_caps([
            Capability::ViewTickets,
            Capability::ReplyTickets,
            Capability::ClaimTickets,
            Capability::AssignTickets,
            Capability::UpdateTicketStatus,
            Capability::EscalateTickets,
            Capability::CloseTickets,
            Capability::GenerateTranscripts,
            Capability::ManageStaff,
            Capability::ManagePay,
            Capability::ViewAuditLog,
        ]);
        Model::create(db, "Manager", Some(1), false, &manager, Some("#5865f2"))
            .await
            .expect("failed to seed Manager role");

        let support = CapabilitySet::from_caps([
            Capability::ViewTickets,
            Capability::ReplyTickets,
            Capability::ClaimTickets,
            Capability::UpdateTicketStatus,
            Capability::EscalateTickets,
            Capability::CloseTickets,
        ]);
        Model::create(db, "Support", Some(5), false, &support, Some("#57f287"))
            .await
            .expect("failed to seed Support role");
    }
}
