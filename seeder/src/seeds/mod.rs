pub mod role;
pub mod staff;
pub mod ticket_panel;
pub mod ticket_status;
