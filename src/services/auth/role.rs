use serde_json::Value;

/// Roles this service grants access to. Anything else in a token is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    /// Exact authority names only (`ROLE_USER`, `ROLE_ADMIN`); surrounding whitespace
    /// is ignored.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "ROLE_USER" => Some(Self::User),
            "ROLE_ADMIN" => Some(Self::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "ROLE_USER",
            Self::Admin => "ROLE_ADMIN",
        }
    }
}

/// Reads the `roles` claim, which may be a JSON array of strings or a single
/// comma-separated string. Any other shape yields no roles.
pub fn parse_roles(claim: &Value) -> Vec<Role> {
    let raw: Vec<&str> = match claim {
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        Value::String(s) => s.split(',').collect(),
        _ => Vec::new(),
    };

    let mut roles = Vec::new();
    for role in raw.into_iter().filter_map(Role::parse) {
        if !roles.contains(&role) {
            roles.push(role);
        }
    }
    roles
}
