//! Errors raised by the messenger API client.

use serde_json::Value;
use thiserror::Error;

pub const TWO_FACTOR_MESSAGE: &str =
    "You have two factor authentication enabled. Two factor authentication is not yet supported.";
pub const UNKNOWN_LOGIN_ERROR: &str = "An unknown error occurred.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("rejected by service (status {status}){}", message_suffix(.message))]
    Rejected {
        status: u16,
        message: Option<String>,
        payload: Value,
    },

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("invalid client configuration: {0}")]
    Config(String),

    #[error("failed to read upload: {0}")]
    Io(#[from] std::io::Error),
}

fn message_suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {}", m))
        .unwrap_or_default()
}

impl ApiError {
    /// Build a rejection from a status code and whatever JSON body came back.
    pub fn rejected(status: u16, payload: Value) -> Self {
        let message = payload
            .get("message")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string);
        ApiError::Rejected {
            status,
            message,
            payload,
        }
    }

    pub fn two_factor_required(&self) -> bool {
        match self {
            ApiError::Rejected { payload, .. } => payload
                .get("two_factor_required")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            _ => false,
        }
    }

    /// Message supplied by the service, if any.
    pub fn service_message(&self) -> Option<&str> {
        match self {
            ApiError::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Rejected { status: 401 | 403, .. })
    }
}

/// Text shown on the login form for a failed login.
///
/// The two-factor flag wins over any message the service attached.
pub fn login_error_message(error: &ApiError) -> String {
    if error.two_factor_required() {
        return TWO_FACTOR_MESSAGE.to_string();
    }
    error
        .service_message()
        .unwrap_or(UNKNOWN_LOGIN_ERROR)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_two_factor_flag_wins_over_message() {
        let err = ApiError::rejected(
            400,
            json!({"message": "challenge", "two_factor_required": true}),
        );
        assert!(err.two_factor_required());
        assert_eq!(login_error_message(&err), TWO_FACTOR_MESSAGE);
    }

    #[test]
    fn test_service_message_is_used() {
        let err = ApiError::rejected(400, json!({"message": "The password you entered is incorrect."}));
        assert_eq!(
            login_error_message(&err),
            "The password you entered is incorrect."
        );
    }

    #[test]
    fn test_generic_fallback() {
        let err = ApiError::rejected(500, Value::Null);
        assert_eq!(login_error_message(&err), UNKNOWN_LOGIN_ERROR);

        let err = ApiError::rejected(400, json!({"message": "   "}));
        assert_eq!(login_error_message(&err), UNKNOWN_LOGIN_ERROR);

        let err = ApiError::Decode("missing field".into());
        assert_eq!(login_error_message(&err), UNKNOWN_LOGIN_ERROR);
    }

    #[test]
    fn test_unauthorized_statuses() {
        assert!(ApiError::rejected(401, Value::Null).is_unauthorized());
        assert!(ApiError::rejected(403, Value::Null).is_unauthorized());
        assert!(!ApiError::rejected(429, Value::Null).is_unauthorized());
    }

    #[test]
    fn test_display_includes_message() {
        let err = ApiError::rejected(429, json!({"message": "Please wait a few minutes"}));
        assert_eq!(
            err.to_string(),
            "rejected by service (status 429): Please wait a few minutes"
        );
    }
}
