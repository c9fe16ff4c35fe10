//! Calorie Tracker Library
//!
//! Dish calorie lookups scaled by servings or grams, with persisted
//! lookup histories and a signed-in session.

pub mod api;
pub mod build_info;
pub mod config;
pub mod db;
pub mod mcp;
pub mod models;
pub mod nutrition;
pub mod store;
pub mod tools;
pub mod validation;
