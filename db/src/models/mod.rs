pub mod audit_log;
pub mod panel_role_access;
pub mod role;
pub mod staff_member;
pub mod staff_notification;
pub mod staff_pay_adjustment;
pub mod ticket;
pub mod ticket_attachment;
pub mod ticket_claim;
pub mod ticket_message;
pub mod ticket_panel;
pub mod ticket_status;
pub mod ticket_transcript;
pub mod user;
