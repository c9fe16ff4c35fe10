//! Calorie Tracker
//!
//! An MCP server for dish calorie lookups and meal history.

use std::sync::Arc;

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

use calorie_tracker::api::ApiClient;
use calorie_tracker::build_info;
use calorie_tracker::config::AppConfig;
use calorie_tracker::db;
use calorie_tracker::mcp::CalorieService;
use calorie_tracker::store::{KeyValueStore, Stores};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (output to stderr to not interfere with MCP stdio)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("calorie_tracker=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    // Print startup banner to stderr
    build_info::print_startup_banner();
    eprintln!("Starting MCP server on stdio...");

    let config = AppConfig::from_env()?;
    eprintln!("Database path: {}", config.database_path.display());
    eprintln!("API base URL: {}", config.api_base_url);

    // Ensure data directory exists
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Initialize database
    eprintln!("Initializing database...");
    let database = db::Database::new(&config.database_path)?;

    // Run migrations
    database.with_conn(|conn| {
        db::migrations::run_migrations(conn)?;
        let version = db::migrations::get_schema_version(conn)?;
        eprintln!("Database schema version: {}", version);
        Ok(())
    })?;

    // Restore the session and histories
    let api = Arc::new(ApiClient::new(config.api_base_url.clone())?);
    let storage: Arc<dyn KeyValueStore> = Arc::new(database);
    let stores = Arc::new(Stores::open(storage, api.clone(), config.history_capacity)?);

    let service = CalorieService::new(config.database_path.clone(), api, stores);

    // Create stdio transport
    let transport = (stdin(), stdout());

    // Start the MCP server
    let server = service.serve(transport).await?;

    // Wait for the server to complete
    server.waiting().await?;

    Ok(())
}
