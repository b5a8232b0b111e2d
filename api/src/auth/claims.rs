use db::models::{role, staff_member, user};

/// The authenticated user resolved from the session cookie, inserted into
/// request extensions by the auth guards.
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

/// The acting staff member and their role, resolved once per request.
///
/// Only active staff members get a `StaffContext`; a deactivated member is
/// indistinguishable from a plain user.
#[derive(Debug, Clone)]
pub struct StaffContext {
    pub staff: staff_member::Model,
    pub role: role::Model,
}

impl StaffContext {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin
    }
}
