use db::models::role;
use db::permissions::CapabilitySet;
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
pub struct RoleResponse {
    pub id: i64,
    pub name: String,
    pub sort_order: Option<i32>,
    pub is_admin: bool,
    /// `"*"` for the wildcard, otherwise an array of capability strings.
    pub permissions: Value,
    pub color: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<role::Model> for RoleResponse {
    fn from(role: role::Model) -> Self {
        let permissions =
            serde_json::from_str(&role.permissions).unwrap_or_else(|_| Value::Array(vec![]));
        Self {
            id: role.id,
            name: role.name,
            sort_order: role.sort_order,
            is_admin: role.is_admin,
            permissions,
            color: role.color,
            created_at: role.created_at.to_rfc3339(),
            updated_at: role.updated_at.to_rfc3339(),
        }
    }
}

/// Parses a request's `permissions` field: the wildcard string `"*"` or an
/// array of capability strings. Unknown strings are dropped, mirroring the
/// storage-side parse.
pub fn parse_permissions(value: &Value) -> CapabilitySet {
    CapabilitySet::parse(&value.to_string())
}
