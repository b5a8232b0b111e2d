pub mod m202607010001_create_users;
pub mod m202607010002_create_roles;
pub mod m202607010003_create_staff_members;
pub mod m202607010004_create_ticket_panels;
pub mod m202607010005_create_panel_role_access;
pub mod m202607010006_create_ticket_statuses;
pub mod m202607010007_create_tickets;
pub mod m202607010008_create_ticket_messages;
pub mod m202607010009_create_ticket_attachments;
pub mod m202607010010_create_ticket_claims;
pub mod m202607050001_create_ticket_transcripts;
pub mod m202607050002_create_audit_log;
pub mod m202607120001_create_staff_notifications;
pub mod m202607120002_create_staff_pay_adjustments;
