//! Error taxonomy for backend calls
//!
//! Every fallible client operation resolves into one of five kinds, so
//! callers can branch on what went wrong without inspecting raw HTTP
//! statuses. The mapping from a response is fixed: 401 and 403 are
//! authorization failures, any other 4xx is a validation failure, 5xx is
//! a server failure. A 2xx whose body cannot be decoded is a malformed
//! response, and anything that never produced a response is transport.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors surfaced by client operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response (DNS, connect, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// 401 or 403, including a 401 that survived the refresh-and-replay
    /// cycle, and a refresh attempted without stored credentials.
    #[error("authorization failed: {0}")]
    Authorization(String),

    /// Any other 4xx; carries the backend's field errors where present.
    #[error("validation failed: {0}")]
    Validation(String),

    /// 5xx from the backend.
    #[error("server error: {0}")]
    Server(String),

    /// A success status whose body does not match the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Result alias using [`ApiError`]
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Classify a non-success response by status code and body.
    pub(crate) fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let message = extract_message(body).unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });
        match status.as_u16() {
            401 | 403 => Self::Authorization(message),
            400..=499 => Self::Validation(message),
            _ => Self::Server(message),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Pull a human-readable message out of an error body.
///
/// Precedence: a `message` field, then `detail`, then Django-style field
/// errors (`{"username": ["taken"]}` flattens to `username: taken`).
/// Returns `None` for bodies that are not JSON objects.
fn extract_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    let object = value.as_object()?;

    for key in ["message", "detail"] {
        if let Some(text) = object.get(key).and_then(|v| v.as_str()) {
            return Some(text.to_string());
        }
    }

    let mut parts = Vec::new();
    for (field, errors) in object {
        let Some(list) = errors.as_array() else {
            continue;
        };
        let messages: Vec<&str> = list.iter().filter_map(|e| e.as_str()).collect();
        if !messages.is_empty() {
            parts.push(format!("{field}: {}", messages.join(", ")));
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_401_is_authorization() {
        let err = ApiError::from_response(StatusCode::UNAUTHORIZED, b"{}");
        assert!(matches!(err, ApiError::Authorization(_)));
    }

    #[test]
    fn status_403_is_authorization() {
        let err = ApiError::from_response(StatusCode::FORBIDDEN, b"{}");
        assert!(matches!(err, ApiError::Authorization(_)));
    }

    #[test]
    fn status_400_is_validation() {
        let err = ApiError::from_response(StatusCode::BAD_REQUEST, b"{}");
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn status_404_is_validation() {
        let err = ApiError::from_response(StatusCode::NOT_FOUND, b"{}");
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn status_500_is_server() {
        let err = ApiError::from_response(StatusCode::INTERNAL_SERVER_ERROR, b"{}");
        assert!(matches!(err, ApiError::Server(_)));
    }

    #[test]
    fn status_503_is_server() {
        let err = ApiError::from_response(StatusCode::SERVICE_UNAVAILABLE, b"{}");
        assert!(matches!(err, ApiError::Server(_)));
    }

    #[test]
    fn message_field_takes_precedence() {
        let body = br#"{"message": "offer letter already approved", "detail": "ignored"}"#;
        let err = ApiError::from_response(StatusCode::BAD_REQUEST, body);
        assert_eq!(
            err.to_string(),
            "validation failed: offer letter already approved"
        );
    }

    #[test]
    fn detail_field_is_second_choice() {
        let body = br#"{"detail": "No active account found with the given credentials"}"#;
        let err = ApiError::from_response(StatusCode::UNAUTHORIZED, body);
        assert_eq!(
            err.to_string(),
            "authorization failed: No active account found with the given credentials"
        );
    }

    #[test]
    fn field_errors_are_flattened() {
        let body = br#"{"username": ["A user with that username already exists."]}"#;
        let err = ApiError::from_response(StatusCode::BAD_REQUEST, body);
        assert_eq!(
            err.to_string(),
            "validation failed: username: A user with that username already exists."
        );
    }

    #[test]
    fn unreadable_body_falls_back_to_status_reason() {
        let err = ApiError::from_response(StatusCode::BAD_REQUEST, b"<html>oops</html>");
        assert_eq!(err.to_string(), "validation failed: Bad Request");
    }

    #[test]
    fn empty_body_falls_back_to_status_reason() {
        let err = ApiError::from_response(StatusCode::INTERNAL_SERVER_ERROR, b"");
        assert_eq!(err.to_string(), "server error: Internal Server Error");
    }
}
