//! Normalized request failure.

use serde_json::Value;
use thiserror::Error;

/// Where a request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// No response arrived.
    Transport,
    /// The backend answered with a non-2xx status.
    Status,
    /// A body could not be encoded, or a 2xx body did not match the expected shape.
    Payload,
}

/// Failure of a backend request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    /// Human-readable message, taken from the backend when it supplied one.
    pub message: String,
    /// HTTP status of the response, if one arrived.
    pub status: Option<u16>,
    /// Stage at which the request failed.
    pub kind: ApiErrorKind,
}

impl ApiError {
    /// Creates a transport-level error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            kind: ApiErrorKind::Transport,
        }
    }

    /// Creates an error for a response status with an explicit message.
    #[must_use]
    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: Some(status),
            kind: ApiErrorKind::Status,
        }
    }

    /// Builds the error for a non-2xx response, extracting the backend message from
    /// `{"detail": "..."}`, `{"detail": [{"msg": ...}]}`, `{"message": "..."}` or a plain
    /// string body.
    #[must_use]
    pub fn from_response(status: u16, body: Option<&Value>) -> Self {
        let message = body
            .and_then(extract_message)
            .unwrap_or_else(|| format!("Request failed with status {status}"));
        Self::with_status(status, message)
    }

    /// Creates an error for a 2xx body that did not match the expected shape.
    #[must_use]
    pub fn decode(status: u16, message: impl std::fmt::Display) -> Self {
        Self {
            message: format!("Unexpected response from server: {message}"),
            status: Some(status),
            kind: ApiErrorKind::Payload,
        }
    }

    /// Creates an error for a request body that could not be serialized.
    #[must_use]
    pub fn encode(message: impl std::fmt::Display) -> Self {
        Self {
            message: format!("Failed to encode request: {message}"),
            status: None,
            kind: ApiErrorKind::Payload,
        }
    }

    /// Returns whether the session was rejected.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self.kind, ApiErrorKind::Status) && matches!(self.status, Some(401))
    }

    /// Returns whether the resource does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.kind, ApiErrorKind::Status) && matches!(self.status, Some(404))
    }

    /// Returns whether the failure happened before a response was received.
    #[must_use]
    pub const fn is_network_error(&self) -> bool {
        matches!(self.kind, ApiErrorKind::Transport)
    }

    /// Returns whether a body could not be encoded or decoded.
    #[must_use]
    pub const fn is_decode_error(&self) -> bool {
        matches!(self.kind, ApiErrorKind::Payload)
    }
}

fn extract_message(body: &Value) -> Option<String> {
    match body {
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Value::Object(map) => match map.get("detail").or_else(|| map.get("message")) {
            Some(Value::String(text)) => Some(text.clone()),
            Some(Value::Array(items)) => {
                let messages: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(Value::as_str))
                    .collect();
                (!messages.is_empty()).then(|| messages.join("; "))
            }
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detail_string() {
        let err = ApiError::from_response(409, Some(&json!({"detail": "Price is locked"})));
        assert_eq!(err.message, "Price is locked");
        assert_eq!(err.status, Some(409));
    }

    #[test]
    fn test_detail_validation_list() {
        let body = json!({"detail": [
            {"loc": ["body", "name"], "msg": "field required"},
            {"loc": ["body", "value"], "msg": "value must be positive"}
        ]});
        let err = ApiError::from_response(422, Some(&body));
        assert_eq!(err.message, "field required; value must be positive");
    }

    #[test]
    fn test_message_field_and_plain_text() {
        let err = ApiError::from_response(500, Some(&json!({"message": "boom"})));
        assert_eq!(err.message, "boom");

        let err = ApiError::from_response(502, Some(&json!("Bad Gateway")));
        assert_eq!(err.message, "Bad Gateway");
    }

    #[test]
    fn test_generic_fallback() {
        let err = ApiError::from_response(503, None);
        assert_eq!(err.message, "Request failed with status 503");

        let err = ApiError::from_response(500, Some(&json!({"detail": []})));
        assert_eq!(err.message, "Request failed with status 500");
    }

    #[test]
    fn test_classification() {
        assert!(ApiError::with_status(401, "expired").is_unauthorized());
        assert!(ApiError::with_status(404, "gone").is_not_found());
        assert!(ApiError::network("refused").is_network_error());
    }

    #[test]
    fn test_decode_error_is_not_network_error() {
        let err = ApiError::decode(200, "missing field `id`");
        assert!(err.is_decode_error());
        assert!(!err.is_network_error());
        assert_eq!(err.status, Some(200));
        assert_eq!(err.message, "Unexpected response from server: missing field `id`");
    }
}
