//! Request-scoped caller context, inserted by the auth middleware.

use truetag_auth::Role;
use truetag_core::UserId;

/// Verified identity of the caller for the current request.
#[derive(Debug, Clone, Copy)]
pub struct CallerContext {
    user_id: UserId,
    role: Role,
}

impl CallerContext {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
