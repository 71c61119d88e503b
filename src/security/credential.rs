//! Bearer credential shape check.
//!
//! The gateway only checks that a protected request carries
//! `Authorization: Bearer <token>`. Whether the token is genuine is decided
//! by the backend that receives it; the header is forwarded untouched.

use axum::http::HeaderValue;

use crate::error::AuthError;

/// Scheme prefix, including the separating space. Case-sensitive.
pub const BEARER_PREFIX: &str = "Bearer ";

/// An opaque token that passed the shape check.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
}

impl Credential {
    pub fn token(&self) -> &str {
        &self.token
    }
}

// Tokens stay out of logs.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential").field("token", &"<redacted>").finish()
    }
}

/// Stateless checker for the `Authorization` header.
#[derive(Debug, Clone, Copy, Default)]
pub struct CredentialGate;

impl CredentialGate {
    pub fn check(&self, header: Option<&HeaderValue>) -> Result<Credential, AuthError> {
        let raw = match header {
            None => return Err(AuthError::Missing),
            Some(value) if value.is_empty() => return Err(AuthError::Missing),
            Some(value) => value.to_str().map_err(|_| AuthError::MalformedScheme)?,
        };

        let token = raw
            .strip_prefix(BEARER_PREFIX)
            .ok_or(AuthError::MalformedScheme)?;

        if token.is_empty() {
            return Err(AuthError::EmptyToken);
        }

        Ok(Credential {
            token: token.to_string(),
        })
    }
}
