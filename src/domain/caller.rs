use super::Role;

/// The authenticated identity behind a request.
///
/// Authentication itself happens in the transport layer; the core only
/// consumes the outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
    pub role: Role,
}

impl Caller {
    pub fn user(user_id: impl Into<String>) -> Self {
        Self { user_id: user_id.into(), role: Role::User }
    }

    pub fn admin(user_id: impl Into<String>) -> Self {
        Self { user_id: user_id.into(), role: Role::Admin }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Owner-or-admin: the single ownership rule for every owned resource.
    pub fn can_access(&self, owner_id: &str) -> bool {
        self.user_id == owner_id || self.is_admin()
    }
}
