//! MCP server

pub mod server;

pub use server::CalorieService;
