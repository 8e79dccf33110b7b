//! Session token handling.

use actix_identity::Identity;
use jsonwebtoken::{DecodingKey, Validation, decode};

use crate::domain::auth::AuthenticatedUser;
use crate::services::{ServiceError, ServiceResult};

/// Source of the raw session token.
pub trait SessionProvider {
    fn session_token(&self) -> Option<String>;
}

impl SessionProvider for Identity {
    fn session_token(&self) -> Option<String> {
        self.id().ok()
    }
}

impl SessionProvider for Option<String> {
    fn session_token(&self) -> Option<String> {
        self.clone()
    }
}

/// Decodes and verifies an HS256 session token.
pub fn decode_user(token: &str, secret: &str) -> ServiceResult<AuthenticatedUser> {
    decode::<AuthenticatedUser>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|err| {
        log::warn!("Rejected session token: {err}");
        ServiceError::Unauthorized
    })
}

/// User behind the current session.
pub fn current_user(
    provider: &dyn SessionProvider,
    secret: &str,
) -> ServiceResult<AuthenticatedUser> {
    let token = provider.session_token().ok_or(ServiceError::Unauthorized)?;
    decode_user(&token, secret)
}
