//! HTTP client for the calorie API

use std::sync::RwLock;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::{error_message_from_body, ApiError, ApiResult, GENERIC_ERROR_MESSAGE};
use crate::models::{
    AuthResponse, BaseLookupResult, CalorieRequest, LoginRequest, RegisterRequest, User,
};

/// Client for the remote auth and calorie endpoints.
///
/// The bearer token is shared state: the auth store sets it and every
/// request reads it.
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        let http = Client::builder()
            .user_agent(concat!("calorie-tracker/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_token(&self, token: Option<String>) {
        let mut guard = self.token.write().unwrap_or_else(|e| e.into_inner());
        *guard = token;
    }

    pub fn has_token(&self) -> bool {
        self.current_token().is_some()
    }

    fn current_token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    pub async fn register(&self, data: &RegisterRequest) -> ApiResult<AuthResponse> {
        self.send(Method::POST, "/auth/register", Some(data)).await
    }

    pub async fn login(&self, data: &LoginRequest) -> ApiResult<AuthResponse> {
        self.send(Method::POST, "/auth/login", Some(data)).await
    }

    pub async fn get_user(&self) -> ApiResult<User> {
        self.send::<User, ()>(Method::GET, "/auth/me", None).await
    }

    /// Fetch nutrition data for `servings` of a dish
    pub async fn get_calories(&self, data: &CalorieRequest) -> ApiResult<BaseLookupResult> {
        self.send(Method::POST, "/get-calories", Some(data)).await
    }

    async fn send<T, B>(&self, method: Method, endpoint: &str, body: Option<&B>) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let token = self.current_token();
        tracing::debug!("API {} {} (token present: {})", method, endpoint, token.is_some());

        let mut builder = self
            .http
            .request(method, self.url(endpoint))
            .header(CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::warn!("API request {} failed: {}", endpoint, e);
            ApiError::from(e)
        })?;

        let status = response.status();
        tracing::debug!("API response {} -> {}", endpoint, status);

        if !status.is_success() {
            let err = error_from_response(response).await;
            tracing::warn!("API error {} ({}): {}", endpoint, status.as_u16(), err);
            return Err(err);
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })
    }
}

async fn error_from_response(response: Response) -> ApiError {
    let status = response.status().as_u16();
    let message = match response.json::<serde_json::Value>().await {
        Ok(body) => error_message_from_body(&body).unwrap_or_else(|| format!("HTTP {}", status)),
        Err(_) => GENERIC_ERROR_MESSAGE.to_string(),
    };
    ApiError::Status { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::new("http://localhost:8000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url("/auth/me"), "http://localhost:8000/auth/me");
    }

    #[test]
    fn test_token_set_and_cleared() {
        let client = ApiClient::new("http://localhost:8000").unwrap();
        assert!(!client.has_token());
        client.set_token(Some("abc".into()));
        assert!(client.has_token());
        client.set_token(None);
        assert!(!client.has_token());
    }
}
