mod helpers;

mod admin_routes_test;
mod staff_ticket_routes_test;
mod ticket_routes_test;
