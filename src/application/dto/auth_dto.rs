//! Authentication DTOs.

use serde::Deserialize;

use crate::domain::entities::User;

/// Credentials entered on the sign-in screen.
#[derive(Debug, Clone)]
pub struct LoginRequest {
    /// Account name.
    pub username: String,
    /// Plain-text password; only ever sent in the form body.
    pub password: String,
}

impl LoginRequest {
    /// Creates new login request.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Body returned by `POST /auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// Bearer token.
    pub access_token: String,
    /// Token type, `bearer`.
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Login response data.
#[derive(Debug, Clone)]
pub struct LoginResponse {
    /// Authenticated user.
    pub user: User,
}

impl LoginResponse {
    /// Creates new login response.
    #[must_use]
    pub const fn new(user: User) -> Self {
        Self { user }
    }
}
