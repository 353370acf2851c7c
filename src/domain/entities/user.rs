//! Signed-in user record.

use serde::{Deserialize, Serialize};

/// User persisted under the `user` storage key as `{"username": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
}

impl User {
    /// Creates a user with only a username.
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            role: None,
        }
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the role, when the backend supplied one.
    #[must_use]
    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_username_record() {
        let json = serde_json::to_string(&User::new("admin")).unwrap();
        assert_eq!(json, r#"{"username":"admin"}"#);
    }

    #[test]
    fn test_parses_record_with_role() {
        let user: User = serde_json::from_str(r#"{"username":"ops","role":"admin"}"#).unwrap();
        assert_eq!(user.username(), "ops");
        assert_eq!(user.role(), Some("admin"));
    }
}
