//! Signed-in user as carried in the session token.

use serde::{Deserialize, Serialize};

use crate::domain::types::Role;

/// Claims of the session token issued by the sign-in service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub roles: Vec<String>,
    pub exp: usize,
}

impl AuthenticatedUser {
    /// Whether `role` is among the user's role names.
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.iter().any(|name| name == role.as_str())
    }

    /// Role whose dashboard the user lands on; admin wins over manager
    /// which wins over parent.
    pub fn primary_role(&self) -> Option<Role> {
        [Role::Admin, Role::Manager, Role::Parent]
            .into_iter()
            .find(|role| self.has_role(*role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(roles: &[&str]) -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "1".to_string(),
            email: "user@example.com".to_string(),
            name: "User".to_string(),
            roles: roles.iter().map(|role| role.to_string()).collect(),
            exp: 0,
        }
    }

    #[test]
    fn primary_role_prefers_the_widest_access() {
        assert_eq!(user(&["parent", "admin"]).primary_role(), Some(Role::Admin));
        assert_eq!(user(&["manager"]).primary_role(), Some(Role::Manager));
        assert_eq!(user(&["crm"]).primary_role(), None);
    }
}
