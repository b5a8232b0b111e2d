use sea_orm_migration::prelude::*;

use crate::migrations;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(migrations::m202607010001_create_users::Migration),
            Box::new(migrations::m202607010002_create_roles::Migration),
            Box::new(migrations::m202607010003_create_staff_members::Migration),
            Box::new(migrations::m202607010004_create_ticket_panels::Migration),
            Box::new(migrations::m202607010005_create_panel_role_access::Migration),
            Box::new(migrations::m202607010006_create_ticket_statuses::Migration),
            Box::new(migrations::m202607010007_create_tickets::Migration),
            Box::new(migrations::m202607010008_create_ticket_messages::Migration),
            Box::new(migrations::m202607010009_create_ticket_attachments::Migration),
            Box::new(migrations::m202607010010_create_ticket_claims::Migration),
            Box::new(migrations::m202607050001_create_ticket_transcripts::Migration),
            Box::new(migrations::m202607050002_create_audit_log::Migration),
            Box::new(migrations::m202607120001_create_staff_notifications::Migration),
            Box::new(migrations::m202607120002_create_staff_pay_adjustments::Migration),
        ]
    }
}
