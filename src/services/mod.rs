//! Workflows behind the HTTP handlers.

use chrono::{Local, NaiveDate};
use thiserror::Error;

use crate::dialog::DialogError;
use crate::domain::auth::AuthenticatedUser;
use crate::domain::types::{Role, TypeConstraintError};
use crate::forms::FormError;
use crate::models::config::ServerConfig;
use crate::repository::errors::RepositoryError;

pub mod auth;
pub mod dashboard;
pub mod records;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("not found")]
    NotFound,

    #[error("form error: {0}")]
    Form(String),

    #[error(transparent)]
    TypeConstraint(#[from] TypeConstraintError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Dialog(#[from] DialogError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<FormError> for ServiceError {
    fn from(err: FormError) -> Self {
        ServiceError::Form(err.to_string())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Display settings shared by every page of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSettings {
    pub date_format: String,
    pub items_per_page: usize,
    pub today: NaiveDate,
}

impl PageSettings {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            date_format: config.date_format.clone(),
            items_per_page: config.items_per_page.max(1),
            today: Local::now().date_naive(),
        }
    }
}

/// Whether any of `roles` grants `role`.
pub fn check_role(role: Role, roles: &[String]) -> bool {
    roles.iter().any(|name| name == role.as_str())
}

/// Fails with [`ServiceError::Unauthorized`] unless the user holds one of `allowed`.
pub fn ensure_role(user: &AuthenticatedUser, allowed: &[Role]) -> ServiceResult<()> {
    if allowed.iter().any(|role| check_role(*role, &user.roles)) {
        Ok(())
    } else {
        log::warn!("User {} lacks any of {allowed:?}", user.email);
        Err(ServiceError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_role_accepts_any_allowed_role() {
        let user = AuthenticatedUser {
            sub: "7".to_string(),
            email: "manager@example.com".to_string(),
            name: "Manager".to_string(),
            roles: vec!["manager".to_string()],
            exp: 0,
        };
        assert!(ensure_role(&user, &[Role::Admin, Role::Manager]).is_ok());
        assert!(matches!(
            ensure_role(&user, &[Role::Admin]),
            Err(ServiceError::Unauthorized)
        ));
    }
}
