//! User and authentication payloads

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Response from `/auth/register` and `/auth/login`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

impl AuthResponse {
    /// The bearer token, preferring `access_token` over `token`. Empty
    /// strings count as missing.
    pub fn bearer_token(&self) -> Option<&str> {
        non_empty(&self.access_token).or_else(|| non_empty(&self.token))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|t| !t.is_empty())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    /// Names and email with surrounding whitespace removed. The password is
    /// sent as typed.
    pub fn trimmed(self) -> Self {
        Self {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password,
        }
    }
}

impl LoginRequest {
    pub fn trimmed(self) -> Self {
        Self {
            email: self.email.trim().to_string(),
            password: self.password,
        }
    }
}

/// Body of `POST /get-calories`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalorieRequest {
    pub dish_name: String,
    pub servings: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trimmed_keeps_password() {
        let data = RegisterRequest {
            first_name: " Ada ".into(),
            last_name: "Lovelace\n".into(),
            email: "  ada@example.com ".into(),
            password: " secret1 ".into(),
        }
        .trimmed();
        assert_eq!(data.first_name, "Ada");
        assert_eq!(data.last_name, "Lovelace");
        assert_eq!(data.email, "ada@example.com");
        assert_eq!(data.password, " secret1 ");

        let login = LoginRequest {
            email: "\tada@example.com".into(),
            password: "pw ".into(),
        }
        .trimmed();
        assert_eq!(login.email, "ada@example.com");
        assert_eq!(login.password, "pw ");
    }

    #[test]
    fn test_bearer_token_prefers_access_token() {
        let response = AuthResponse {
            access_token: Some("abc".into()),
            token: Some("def".into()),
            ..Default::default()
        };
        assert_eq!(response.bearer_token(), Some("abc"));
    }

    #[test]
    fn test_bearer_token_falls_back_to_token() {
        let response: AuthResponse = serde_json::from_str(r#"{"token": "def"}"#).unwrap();
        assert_eq!(response.bearer_token(), Some("def"));

        let empty_access: AuthResponse =
            serde_json::from_str(r#"{"access_token": "", "token": "def"}"#).unwrap();
        assert_eq!(empty_access.bearer_token(), Some("def"));

        let empty: AuthResponse = serde_json::from_str(r#"{"access_token": ""}"#).unwrap();
        assert_eq!(empty.bearer_token(), None);
    }
}
