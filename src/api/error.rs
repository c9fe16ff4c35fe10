//! API error types

use serde_json::Value;
use thiserror::Error;

/// Message used when an error response carries no readable body
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred";

/// Message the API returns when no food matches the dish name
pub const DISH_NOT_FOUND: &str = "Dish not found";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response; `message` is the best readable reason
    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Invalid response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            ApiError::Decode { .. } => None,
        }
    }

    /// True when the lookup failed only because the dish is unknown
    pub fn is_dish_not_found(&self) -> bool {
        matches!(self, ApiError::Status { message, .. } if message == DISH_NOT_FOUND)
    }
}

/// Pick the error reason from a JSON error body: `detail`, then `message`
pub fn error_message_from_body(body: &Value) -> Option<String> {
    for key in ["detail", "message"] {
        match body.get(key) {
            Some(Value::String(s)) if s.is_empty() => continue,
            Some(Value::String(s)) => return Some(s.clone()),
            Some(Value::Null) | None => continue,
            Some(other) => return Some(other.to_string()),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detail_wins_over_message() {
        let body = json!({"detail": "Dish not found", "message": "other"});
        assert_eq!(error_message_from_body(&body).as_deref(), Some("Dish not found"));
    }

    #[test]
    fn test_falls_back_to_message() {
        let body = json!({"detail": "", "message": "Invalid credentials"});
        assert_eq!(error_message_from_body(&body).as_deref(), Some("Invalid credentials"));
        assert_eq!(error_message_from_body(&json!({"error": "x"})), None);
    }

    #[test]
    fn test_structured_detail_is_rendered_as_json() {
        let body = json!({"detail": [{"loc": ["body", "servings"], "msg": "field required"}]});
        let message = error_message_from_body(&body).unwrap();
        assert!(message.contains("field required"));
    }

    #[test]
    fn test_dish_not_found_classification() {
        let err = ApiError::Status { status: 404, message: DISH_NOT_FOUND.to_string() };
        assert!(err.is_dish_not_found());
        assert_eq!(err.status(), Some(404));

        let other = ApiError::Status { status: 500, message: "HTTP 500".to_string() };
        assert!(!other.is_dish_not_found());
    }
}
