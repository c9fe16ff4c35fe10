//! Calorie tracker tools
//!
//! MCP tool implementations: each one validates input, talks to the API or
//! the stores, and returns a serializable response or a readable error.

pub mod auth;
pub mod history;
pub mod lookup;
pub mod status;

use crate::api::ApiError;
use crate::store::Stores;

pub const NOT_AUTHENTICATED: &str = "Not authenticated. Call login or register first.";

/// Fail unless a session token is present
pub fn require_auth(stores: &Stores) -> Result<(), String> {
    let auth = stores.auth().map_err(|e| e.to_string())?;
    if auth.is_authenticated() {
        Ok(())
    } else {
        Err(NOT_AUTHENTICATED.to_string())
    }
}

/// Upper-case the first letter of every word, e.g. "dish not found" -> "Dish Not Found"
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_is_word = false;
    for c in text.chars() {
        let is_word = c.is_ascii_alphanumeric() || c == '_';
        if is_word && !prev_is_word {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        prev_is_word = is_word;
    }
    out
}

/// Render a lookup failure; an unknown dish is a warning, not an error
pub fn describe_lookup_error(err: &ApiError) -> String {
    let message = title_case(&err.to_string());
    if err.is_dish_not_found() {
        format!("Warning: {}", message)
    } else {
        format!("Error: {}", message)
    }
}

/// Stores backed by memory and an API client that is never reached
#[cfg(test)]
pub(crate) fn test_stores() -> Stores {
    use std::sync::Arc;

    use crate::api::ApiClient;
    use crate::store::{KeyValueStore, MemoryStore, DEFAULT_HISTORY_CAPACITY};

    let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let api = Arc::new(ApiClient::new("http://127.0.0.1:9").unwrap());
    Stores::open(storage, api, DEFAULT_HISTORY_CAPACITY).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("dish not found"), "Dish Not Found");
        assert_eq!(title_case("HTTP 500"), "HTTP 500");
        assert_eq!(title_case("an error-occurred"), "An Error-Occurred");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_describe_lookup_error() {
        let not_found = ApiError::Status { status: 404, message: "Dish not found".into() };
        assert_eq!(describe_lookup_error(&not_found), "Warning: Dish Not Found");

        let server = ApiError::Status { status: 502, message: "upstream unavailable".into() };
        assert_eq!(describe_lookup_error(&server), "Error: Upstream Unavailable");
    }
}
