//! Account tools
//!
//! Register, log in and out, and report the current session.

use serde::Serialize;

use crate::api::ApiClient;
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, User};
use crate::store::Stores;

#[derive(Debug, Serialize)]
pub struct AuthSummary {
    pub authenticated: bool,
    pub user: Option<User>,
    pub message: String,
}

pub async fn register(api: &ApiClient, stores: &Stores, data: RegisterRequest) -> Result<AuthSummary, String> {
    let data = data.trimmed();
    crate::validation::validate_register(&data).map_err(|e| e.to_string())?;
    let response = api.register(&data).await.map_err(|e| e.to_string())?;
    tracing::info!("Registered account for {}", data.email);
    apply_auth_response(stores, response, "Account created! You can now start tracking calories.")
}

pub async fn login(api: &ApiClient, stores: &Stores, data: LoginRequest) -> Result<AuthSummary, String> {
    let data = data.trimmed();
    crate::validation::validate_login(&data).map_err(|e| e.to_string())?;
    let response = api.login(&data).await.map_err(|e| e.to_string())?;
    tracing::info!("Logged in as {}", data.email);
    apply_auth_response(stores, response, "Welcome back!")
}

pub fn logout(stores: &Stores) -> Result<AuthSummary, String> {
    stores
        .auth()
        .map_err(|e| e.to_string())?
        .logout()
        .map_err(|e| format!("Failed to clear session: {}", e))?;

    Ok(AuthSummary {
        authenticated: false,
        user: None,
        message: "Logged out".to_string(),
    })
}

/// Refresh the stored user from `GET /auth/me`
pub async fn whoami(api: &ApiClient, stores: &Stores) -> Result<AuthSummary, String> {
    let token = {
        let auth = stores.auth().map_err(|e| e.to_string())?;
        match &auth.state().token {
            Some(token) => token.clone(),
            None => return Err(super::NOT_AUTHENTICATED.to_string()),
        }
    };

    let user = match api.get_user().await {
        Ok(user) => user,
        Err(e) if e.status() == Some(401) => {
            tracing::warn!("Stored token was rejected, clearing session");
            stores
                .auth()
                .map_err(|e| e.to_string())?
                .clear_auth()
                .map_err(|e| format!("Failed to clear session: {}", e))?;
            return Err(format!("Session expired: {}", e));
        }
        Err(e) => return Err(e.to_string()),
    };
    stores
        .auth()
        .map_err(|e| e.to_string())?
        .set_auth(Some(token), Some(user.clone()))
        .map_err(|e| format!("Failed to save session: {}", e))?;

    Ok(AuthSummary {
        authenticated: true,
        message: format!("Signed in as {} {}", user.first_name, user.last_name),
        user: Some(user),
    })
}

/// Store the session from a register or login response. A response without
/// a token keeps the user but leaves the session unauthenticated.
fn apply_auth_response(stores: &Stores, response: AuthResponse, message: &str) -> Result<AuthSummary, String> {
    let token = response.bearer_token().map(str::to_string);
    if token.is_none() {
        tracing::warn!("Auth response did not include a token");
    }

    let mut auth = stores.auth().map_err(|e| e.to_string())?;
    auth.set_auth(token, response.user)
        .map_err(|e| format!("Failed to save session: {}", e))?;

    let authenticated = auth.is_authenticated();
    Ok(AuthSummary {
        authenticated,
        user: auth.user().cloned(),
        message: if authenticated {
            message.to_string()
        } else {
            "Login response did not include a token".to_string()
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_stores;
    use serde_json::json;

    fn response(body: serde_json::Value) -> AuthResponse {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_apply_prefers_access_token() {
        let stores = test_stores();
        let summary = apply_auth_response(
            &stores,
            response(json!({
                "access_token": "abc",
                "token": "ignored",
                "user": {"id": "u1", "first_name": "Ada", "last_name": "L", "email": "ada@example.com"}
            })),
            "Welcome back!",
        )
        .unwrap();

        assert!(summary.authenticated);
        assert_eq!(summary.message, "Welcome back!");
        assert_eq!(stores.auth().unwrap().state().token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_apply_without_token() {
        let stores = test_stores();
        let summary = apply_auth_response(&stores, response(json!({"token_type": "bearer"})), "Welcome back!").unwrap();
        assert!(!summary.authenticated);
        assert!(!stores.auth().unwrap().is_authenticated());
    }

    #[test]
    fn test_logout_clears_session() {
        let stores = test_stores();
        stores.auth().unwrap().set_auth(Some("tok".into()), None).unwrap();
        let summary = logout(&stores).unwrap();
        assert!(!summary.authenticated);
        assert!(stores.auth().unwrap().state().token.is_none());
    }

    #[tokio::test]
    async fn test_invalid_login_never_reaches_api() {
        let stores = test_stores();
        let api = ApiClient::new("http://127.0.0.1:9").unwrap();
        let err = login(
            &api,
            &stores,
            LoginRequest {
                email: "nope".into(),
                password: "".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(err.contains("Invalid email address"));
        assert!(err.contains("Password is required"));
    }

    #[tokio::test]
    async fn test_whoami_requires_session() {
        let stores = test_stores();
        let api = ApiClient::new("http://127.0.0.1:9").unwrap();
        assert_eq!(whoami(&api, &stores).await.unwrap_err(), crate::tools::NOT_AUTHENTICATED);
    }
}
