//! Runtime configuration
//!
//! Read from environment variables once at startup.

use std::path::PathBuf;

use thiserror::Error;

use crate::store::DEFAULT_HISTORY_CAPACITY;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("CALTRACK_API_BASE_URL must start with http:// or https://, got '{0}'")]
    InvalidBaseUrl(String),

    #[error("CALTRACK_HISTORY_CAPACITY must be a positive integer, got '{0}'")]
    InvalidCapacity(String),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite file holding the persisted stores
    pub database_path: PathBuf,
    /// Base URL of the calorie API
    pub api_base_url: String,
    /// Entries kept per history
    pub history_capacity: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = lookup("CALTRACK_DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(default_database_path);

        let api_base_url = lookup("CALTRACK_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(api_base_url));
        }
        let api_base_url = api_base_url.trim_end_matches('/').to_string();

        let history_capacity = match lookup("CALTRACK_HISTORY_CAPACITY") {
            Some(raw) => {
                let parsed = raw.trim().parse::<usize>();
                match parsed {
                    Ok(n) if n >= 1 => n,
                    _ => return Err(ConfigError::InvalidCapacity(raw)),
                }
            }
            None => DEFAULT_HISTORY_CAPACITY,
        };

        Ok(Self {
            database_path,
            api_base_url,
            history_capacity,
        })
    }
}

/// `<project>/data/caltrack.db`, found relative to the running executable
fn default_database_path() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    // Go up from target/release or target/debug to project root
    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(grandparent) = path.parent().and_then(|p| p.parent()) {
            path = grandparent.to_path_buf();
        }
    }

    path.push("data");
    path.push("caltrack.db");
    path
}
