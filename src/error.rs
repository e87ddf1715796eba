//! Unified client error model and classification helpers.
//! This module provides a common error enum used across the API layer,
//! the session store and the CLI, along with the single mapping from HTTP
//! statuses to error kinds.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ApiError {
    /// No token/user cached locally. Raised before any request is issued.
    Identity { code: String, message: String },
    /// The server rejected the submitted data (400/422).
    UserInput { code: String, message: String },
    /// The server rejected the credential (401/403).
    Auth { code: String, message: String },
    NotFound { code: String, message: String },
    Conflict { code: String, message: String },
    /// Any other non-2xx response.
    Remote { code: String, message: String },
    /// Connection, DNS or body-decode failure.
    Transport { code: String, message: String },
}

impl ApiError {
    pub fn code_str(&self) -> &str {
        match self {
            ApiError::Identity { code, .. }
            | ApiError::UserInput { code, .. }
            | ApiError::Auth { code, .. }
            | ApiError::NotFound { code, .. }
            | ApiError::Conflict { code, .. }
            | ApiError::Remote { code, .. }
            | ApiError::Transport { code, .. } => code.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Identity { message, .. }
            | ApiError::UserInput { message, .. }
            | ApiError::Auth { message, .. }
            | ApiError::NotFound { message, .. }
            | ApiError::Conflict { message, .. }
            | ApiError::Remote { message, .. }
            | ApiError::Transport { message, .. } => message.as_str(),
        }
    }

    pub fn identity<S: Into<String>>(code: S, msg: S) -> Self { ApiError::Identity { code: code.into(), message: msg.into() } }
    pub fn user<S: Into<String>>(code: S, msg: S) -> Self { ApiError::UserInput { code: code.into(), message: msg.into() } }
    pub fn auth<S: Into<String>>(code: S, msg: S) -> Self { ApiError::Auth { code: code.into(), message: msg.into() } }
    pub fn not_found<S: Into<String>>(code: S, msg: S) -> Self { ApiError::NotFound { code: code.into(), message: msg.into() } }
    pub fn conflict<S: Into<String>>(code: S, msg: S) -> Self { ApiError::Conflict { code: code.into(), message: msg.into() } }
    pub fn remote<S: Into<String>>(code: S, msg: S) -> Self { ApiError::Remote { code: code.into(), message: msg.into() } }
    pub fn transport<S: Into<String>>(code: S, msg: S) -> Self { ApiError::Transport { code: code.into(), message: msg.into() } }

    /// Classify a non-2xx response. The status lands in the code and the
    /// body is summarized into the message; full diagnostics are the API
    /// layer's job to log before calling this.
    pub fn from_status(status: u16, body: &str) -> Self {
        let code = format!("http_{}", status);
        let message = summarize_body(body);
        match status {
            400 | 422 => ApiError::UserInput { code, message },
            401 | 403 => ApiError::Auth { code, message },
            404 => ApiError::NotFound { code, message },
            409 => ApiError::Conflict { code, message },
            _ => ApiError::Remote { code, message },
        }
    }

    /// True for the fail-fast case where no request was issued at all.
    pub fn is_identity(&self) -> bool {
        matches!(self, ApiError::Identity { .. })
    }

    /// Short text suitable for a transient user notification. Remote and
    /// transport failures collapse into one generic message; validation
    /// and identity errors keep enough detail to be actionable.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Identity { .. } => "You are signed out. Please log in first.".to_string(),
            ApiError::UserInput { message, .. } => message.clone(),
            _ => "Something went wrong talking to the movie catalog; please try again later.".to_string(),
        }
    }
}

/// Pull a human-readable line out of an error body. Services in front of
/// this client answer either with a JSON object carrying `message`/`error`
/// or with plain text; anything else is truncated raw.
fn summarize_body(body: &str) -> String {
    const MAX: usize = 200;
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "no response body".to_string();
    }
    let line = serde_json::from_str::<serde_json::Value>(trimmed)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error"))
                .and_then(|m| m.as_str().map(|s| s.to_string()))
        })
        .unwrap_or_else(|| trimmed.to_string());
    if line.chars().count() > MAX {
        line.chars().take(MAX).collect::<String>() + "…"
    } else {
        line
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code_str(), self.message())
    }
}

impl std::error::Error for ApiError {}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport { code: "transport".into(), message: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert!(matches!(ApiError::from_status(400, ""), ApiError::UserInput { .. }));
        assert!(matches!(ApiError::from_status(422, ""), ApiError::UserInput { .. }));
        assert!(matches!(ApiError::from_status(401, ""), ApiError::Auth { .. }));
        assert!(matches!(ApiError::from_status(403, ""), ApiError::Auth { .. }));
        assert!(matches!(ApiError::from_status(404, ""), ApiError::NotFound { .. }));
        assert!(matches!(ApiError::from_status(409, ""), ApiError::Conflict { .. }));
        assert!(matches!(ApiError::from_status(500, ""), ApiError::Remote { .. }));
        assert!(matches!(ApiError::from_status(503, ""), ApiError::Remote { .. }));
    }

    #[test]
    fn status_lands_in_code_not_message() {
        let err = ApiError::from_status(404, "no such movie");
        assert_eq!(err.code_str(), "http_404");
        assert_eq!(err.message(), "no such movie");
    }

    #[test]
    fn body_summary_prefers_json_message_field() {
        let err = ApiError::from_status(422, r#"{"message":"Username must be at least 5 characters"}"#);
        assert_eq!(err.message(), "Username must be at least 5 characters");

        let err = ApiError::from_status(500, r#"{"error":"boom"}"#);
        assert_eq!(err.message(), "boom");

        let err = ApiError::from_status(500, "");
        assert_eq!(err.message(), "no response body");
    }

    #[test]
    fn user_message_collapses_remote_failures() {
        let generic = ApiError::from_status(500, "stack trace here").user_message();
        assert_eq!(generic, ApiError::transport("transport", "connection refused").user_message());
        assert!(!generic.contains("500"));
        assert!(!generic.contains("stack trace"));
    }

    #[test]
    fn user_input_keeps_server_detail() {
        let err = ApiError::from_status(400, r#"{"message":"Email is invalid"}"#);
        assert_eq!(err.user_message(), "Email is invalid");
    }
}
