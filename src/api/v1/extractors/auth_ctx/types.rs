/*
 * Responsibility
 * - The "authenticated context" type handlers see
 * - The middleware verifies the token and stores it in request extensions; handlers only take this type
 *
 * Notes
 * - JWT verification is the middleware/services' job
 * - Role gating is an explicit call (`require_any`) at the top of each handler
 */

use crate::error::AppError;
use crate::services::auth::Role;

/// Context attached to an authenticated request.
///
/// - `username` is the token subject, trimmed and zero-width stripped (case preserved)
/// - `roles` only holds roles this service understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCtx {
    pub username: String,
    pub roles: Vec<Role>,
}

impl AuthCtx {
    pub fn new(username: impl Into<String>, roles: Vec<Role>) -> Self {
        Self {
            username: username.into(),
            roles,
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }

    /// Fails closed: an empty `required` list admits nobody.
    pub fn require_any(&self, required: &[Role]) -> Result<(), AppError> {
        if required.iter().any(|r| self.has_role(*r)) {
            return Ok(());
        }

        tracing::warn!(
            username = %self.username,
            roles = ?self.roles,
            ?required,
            "caller lacks a required role"
        );
        Err(AppError::Forbidden)
    }
}
