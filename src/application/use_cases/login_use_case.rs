//! Login use case implementation.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::dto::{LoginRequest, LoginResponse, TokenResponse};
use crate::application::services::auth_context::AuthContext;
use crate::domain::entities::AuthToken;
use crate::domain::errors::AuthError;
use crate::infrastructure::http::ApiClient;

const LOGIN_PATH: &str = "/auth/login";

/// Handles user authentication workflow.
#[derive(Clone)]
pub struct LoginUseCase {
    api: Arc<ApiClient>,
    auth: Arc<AuthContext>,
}

impl LoginUseCase {
    /// Creates new login use case.
    #[must_use]
    pub const fn new(api: Arc<ApiClient>, auth: Arc<AuthContext>) -> Self {
        Self { api, auth }
    }

    /// Exchanges credentials for a token and starts the session.
    ///
    /// # Errors
    /// Returns error if a credential is empty, the backend rejects it or is unreachable.
    pub async fn execute(&self, request: LoginRequest) -> Result<LoginResponse, AuthError> {
        let username = request.username.trim();
        if username.is_empty() {
            return Err(AuthError::MissingCredential { field: "Username" });
        }
        if request.password.is_empty() {
            return Err(AuthError::MissingCredential { field: "Password" });
        }

        debug!(username, "Attempting login");

        let response: TokenResponse = self
            .api
            .post_form(
                LOGIN_PATH,
                &[("username", username), ("password", &request.password)],
            )
            .await
            .map_err(|e| {
                warn!(error = %e, status = ?e.status, "Login failed");
                match e.status {
                    Some(400 | 401 | 403) => AuthError::Rejected(e.message),
                    _ => AuthError::Request(e),
                }
            })?;

        let token = AuthToken::new(response.access_token).ok_or_else(|| {
            warn!("Login response carried an empty token");
            AuthError::InvalidToken
        })?;

        let user = self.auth.login(token, username);
        info!(username = %user.username(), token_type = ?response.token_type, "Successfully authenticated");

        Ok(LoginResponse::new(user))
    }
}
