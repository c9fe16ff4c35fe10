//! Calorie API client
//!
//! Thin wrapper over the remote auth and lookup endpoints.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::{ApiError, ApiResult};
