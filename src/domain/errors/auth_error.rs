//! Authentication error types.

use thiserror::Error;

use super::{ApiError, StorageError};

/// Authentication error variants.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum AuthError {
    #[error("{field} is required")]
    MissingCredential { field: &'static str },

    #[error("{0}")]
    Rejected(String),

    #[error("login response did not contain a usable access token")]
    InvalidToken,

    #[error("{0}")]
    Request(#[from] ApiError),

    #[error("session storage error: {0}")]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// Message shown on the login screen.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected(message) if !message.is_empty() => message.clone(),
            Self::Rejected(_) => "Invalid credentials. Please try again.".to_string(),
            other => other.to_string(),
        }
    }

    /// Returns whether the user can fix the error by retrying.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::MissingCredential { .. } | Self::Rejected(_) | Self::Request(_)
        )
    }
}
