//! Auth store
//!
//! Persisted session token and user. Every change is pushed into the API
//! client so later requests carry the right bearer token.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::kv::{load_state, save_state, KeyValueStore};
use super::StoreResult;
use crate::api::ApiClient;
use crate::models::User;

pub const AUTH_STORAGE_KEY: &str = "auth-storage";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthState {
    pub token: Option<String>,
    pub user: Option<User>,
    pub is_authenticated: bool,
}

pub struct AuthStore {
    state: AuthState,
    storage: Arc<dyn KeyValueStore>,
    api: Arc<ApiClient>,
}

impl AuthStore {
    /// Restore the persisted session and hand its token to the API client
    pub fn open(storage: Arc<dyn KeyValueStore>, api: Arc<ApiClient>) -> StoreResult<Self> {
        let mut state = load_state::<AuthState>(storage.as_ref(), AUTH_STORAGE_KEY)?.unwrap_or_default();
        state.is_authenticated = state.token.is_some();

        tracing::debug!(
            "Restored auth state (token present: {}, user present: {})",
            state.token.is_some(),
            state.user.is_some()
        );
        api.set_token(state.token.clone());

        Ok(Self { state, storage, api })
    }

    pub fn set_auth(&mut self, token: Option<String>, user: Option<User>) -> StoreResult<()> {
        let next = AuthState {
            is_authenticated: token.is_some(),
            token,
            user,
        };
        self.replace(next)
    }

    /// Forget the session
    pub fn logout(&mut self) -> StoreResult<()> {
        tracing::info!("Logged out");
        self.clear_auth()
    }

    /// Drop the token and user without a user-initiated logout, e.g. after
    /// the server rejects the token
    pub fn clear_auth(&mut self) -> StoreResult<()> {
        self.replace(AuthState::default())
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated
    }

    pub fn user(&self) -> Option<&User> {
        self.state.user.as_ref()
    }

    fn replace(&mut self, next: AuthState) -> StoreResult<()> {
        save_state(self.storage.as_ref(), AUTH_STORAGE_KEY, &next)?;
        self.api.set_token(next.token.clone());
        self.state = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::kv::MemoryStore;

    fn user() -> User {
        User {
            id: "u-1".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
        }
    }

    fn api() -> Arc<ApiClient> {
        Arc::new(ApiClient::new("http://localhost:8000").unwrap())
    }

    #[test]
    fn test_set_auth_updates_client_and_storage() {
        let storage = Arc::new(MemoryStore::new());
        let client = api();
        let mut store = AuthStore::open(storage.clone(), client.clone()).unwrap();
        assert!(!store.is_authenticated());

        store.set_auth(Some("tok".into()), Some(user())).unwrap();
        assert!(store.is_authenticated());
        assert!(client.has_token());
        assert!(storage.get(AUTH_STORAGE_KEY).unwrap().is_some());
    }

    #[test]
    fn test_session_restored_on_open() {
        let storage = Arc::new(MemoryStore::new());
        {
            let mut store = AuthStore::open(storage.clone(), api()).unwrap();
            store.set_auth(Some("tok".into()), Some(user())).unwrap();
        }

        let client = api();
        let restored = AuthStore::open(storage.clone(), client.clone()).unwrap();
        assert!(restored.is_authenticated());
        assert_eq!(restored.user().map(|u| u.first_name.as_str()), Some("Ada"));
        assert!(client.has_token());
    }

    #[test]
    fn test_missing_token_is_not_authenticated() {
        let storage = Arc::new(MemoryStore::new());
        let mut store = AuthStore::open(storage, api()).unwrap();
        store.set_auth(None, Some(user())).unwrap();
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_logout_clears_everything() {
        let storage = Arc::new(MemoryStore::new());
        let client = api();
        let mut store = AuthStore::open(storage.clone(), client.clone()).unwrap();
        store.set_auth(Some("tok".into()), Some(user())).unwrap();
        store.logout().unwrap();

        assert_eq!(store.state(), &AuthState::default());
        assert!(!client.has_token());

        let reopened = AuthStore::open(storage, api()).unwrap();
        assert!(!reopened.is_authenticated());
    }
}
