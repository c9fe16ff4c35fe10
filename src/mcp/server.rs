//! Calorie Tracker MCP Server Implementation
//!
//! Implements the MCP server with all calorie tracker tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::Mutex;

use crate::api::ApiClient;
use crate::models::{LoginRequest, RegisterRequest};
use crate::store::{HistoryKind, Stores};
use crate::tools::status::StatusTracker;
use crate::tools::{auth, history, lookup};

/// Calorie Tracker MCP Service
#[derive(Clone)]
pub struct CalorieService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    api: Arc<ApiClient>,
    stores: Arc<Stores>,
    tool_router: ToolRouter<CalorieService>,
}

impl CalorieService {
    pub fn new(database_path: PathBuf, api: Arc<ApiClient>, stores: Arc<Stores>) -> Self {
        let tracker = StatusTracker::new(database_path, api.base_url());
        Self {
            status_tracker: Arc::new(Mutex::new(tracker)),
            api,
            stores,
            tool_router: Self::tool_router(),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn tool_error(message: String) -> McpError {
    McpError::internal_error(message, None)
}

fn history_kind(name: Option<&str>) -> Result<HistoryKind, McpError> {
    match name {
        None => Ok(HistoryKind::default()),
        Some(name) => HistoryKind::from_str(name).ok_or_else(|| {
            McpError::invalid_params(
                format!("Unknown history '{}'. Use calorie_lookup, meal_log or meal.", name),
                None,
            )
        }),
    }
}

fn entry_not_found(id: &str) -> Value {
    json!({ "error": "History entry not found", "id": id })
}

// ============================================================================
// Account Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RegisterParams {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LoginParams {
    pub email: String,
    pub password: String,
}

// ============================================================================
// Lookup Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LookupCaloriesParams {
    /// Dish to look up, e.g. "chicken biryani"
    pub dish_name: String,
    /// "servings" (default) or "grams"
    #[serde(default = "default_mode")]
    pub mode: String,
    /// Number of servings or grams
    #[serde(default = "default_amount")]
    pub amount: f64,
    /// "calorie_lookup" (default) or "meal_log"
    pub history: Option<String>,
}

fn default_mode() -> String {
    "servings".to_string()
}

fn default_amount() -> f64 {
    1.0
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct QuickLogMealParams {
    pub dish_name: String,
    #[serde(default = "default_amount")]
    pub servings: f64,
}

// ============================================================================
// History Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct HistoryParams {
    /// "calorie_lookup" (default), "meal_log" or "meal"
    pub history: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListHistoryParams {
    pub history: Option<String>,
    /// Maximum entries to return, newest first
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetHistoryEntryParams {
    pub history: Option<String>,
    pub id: String,
}

#[tool_router]
impl CalorieService {
    // --- Status ---

    #[tool(description = "Get the current status of the calorie tracker including build info, database status, session state and history sizes")]
    async fn status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status(&self.stores).map_err(tool_error)?;
        to_json(&status)
    }

    #[tool(description = "Get instructions for looking up calories and reading history. Call this when starting a session or when unsure how to use the tools.")]
    fn usage_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::USAGE_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(USAGE_INSTRUCTIONS)]))
    }

    // --- Account ---

    #[tool(description = "Create an account and sign in")]
    async fn register(
        &self,
        Parameters(p): Parameters<RegisterParams>,
    ) -> Result<CallToolResult, McpError> {
        let data = RegisterRequest {
            first_name: p.first_name,
            last_name: p.last_name,
            email: p.email,
            password: p.password,
        };
        let result = auth::register(&self.api, &self.stores, data)
            .await
            .map_err(tool_error)?;
        to_json(&result)
    }

    #[tool(description = "Sign in with email and password. The session is saved for later runs.")]
    async fn login(
        &self,
        Parameters(p): Parameters<LoginParams>,
    ) -> Result<CallToolResult, McpError> {
        let data = LoginRequest {
            email: p.email,
            password: p.password,
        };
        let result = auth::login(&self.api, &self.stores, data)
            .await
            .map_err(tool_error)?;
        to_json(&result)
    }

    #[tool(description = "Sign out and forget the saved session")]
    fn logout(&self) -> Result<CallToolResult, McpError> {
        let result = auth::logout(&self.stores).map_err(tool_error)?;
        to_json(&result)
    }

    #[tool(description = "Show the signed-in user, refreshed from the server")]
    async fn whoami(&self) -> Result<CallToolResult, McpError> {
        let result = auth::whoami(&self.api, &self.stores)
            .await
            .map_err(tool_error)?;
        to_json(&result)
    }

    // --- Lookup ---

    #[tool(description = "Look up calories and macros for a dish, scaled to a number of servings or grams, and save it to history. low_confidence=true means grams were estimated against a 100 g serving.")]
    async fn lookup_calories(
        &self,
        Parameters(p): Parameters<LookupCaloriesParams>,
    ) -> Result<CallToolResult, McpError> {
        let kind = history_kind(p.history.as_deref())?;
        if kind == HistoryKind::Meal {
            return Err(McpError::invalid_params(
                "lookup_calories records to calorie_lookup or meal_log; use quick_log_meal for meal",
                None,
            ));
        }
        let result =
            lookup::lookup_calories(&self.api, &self.stores, &p.dish_name, &p.mode, p.amount, kind)
                .await
                .map_err(tool_error)?;
        to_json(&result)
    }

    #[tool(description = "Log servings of a dish using the server's totals and save it to the meal history")]
    async fn quick_log_meal(
        &self,
        Parameters(p): Parameters<QuickLogMealParams>,
    ) -> Result<CallToolResult, McpError> {
        let result = lookup::quick_log_meal(&self.api, &self.stores, &p.dish_name, p.servings)
            .await
            .map_err(tool_error)?;
        to_json(&result)
    }

    // --- History ---

    #[tool(description = "List history entries, newest first, with calories, protein, fat and carbs")]
    fn list_history(
        &self,
        Parameters(p): Parameters<ListHistoryParams>,
    ) -> Result<CallToolResult, McpError> {
        let kind = history_kind(p.history.as_deref())?;
        let result = history::list_history(&self.stores, kind, p.limit).map_err(tool_error)?;
        to_json(&result)
    }

    #[tool(description = "Get the full stored lookup result for one history entry")]
    fn get_history_entry(
        &self,
        Parameters(p): Parameters<GetHistoryEntryParams>,
    ) -> Result<CallToolResult, McpError> {
        let kind = history_kind(p.history.as_deref())?;
        let result = history::get_history_entry(&self.stores, kind, &p.id).map_err(tool_error)?;
        match result {
            Some(entry) => to_json(&entry),
            None => to_json(&entry_not_found(&p.id)),
        }
    }

    #[tool(description = "Delete every entry of one history. Cannot be undone.")]
    fn clear_history(
        &self,
        Parameters(p): Parameters<HistoryParams>,
    ) -> Result<CallToolResult, McpError> {
        let kind = history_kind(p.history.as_deref())?;
        let result = history::clear_history(&self.stores, kind).map_err(tool_error)?;
        to_json(&result)
    }

    #[tool(description = "Total searches, total calories and average calories per meal for one history")]
    fn history_stats(
        &self,
        Parameters(p): Parameters<HistoryParams>,
    ) -> Result<CallToolResult, McpError> {
        let kind = history_kind(p.history.as_deref())?;
        let result = history::history_stats(&self.stores, kind).map_err(tool_error)?;
        to_json(&result)
    }

    #[tool(description = "History entries grouped by local day (Today, Yesterday, ...) with daily calorie totals")]
    fn history_by_day(
        &self,
        Parameters(p): Parameters<HistoryParams>,
    ) -> Result<CallToolResult, McpError> {
        let kind = history_kind(p.history.as_deref())?;
        let result = history::history_by_day(&self.stores, kind).map_err(tool_error)?;
        to_json(&result)
    }
}

#[tool_handler]
impl ServerHandler for CalorieService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "calorie-tracker".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Calorie Tracker".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Calorie Tracker - dish calorie lookup with serving and gram scaling. \
                 IMPORTANT: Call usage_instructions first. \
                 Account: register/login/logout/whoami (lookup and history tools need a session). \
                 Lookup: lookup_calories (mode=servings|grams, amount), quick_log_meal. \
                 History (history=calorie_lookup|meal_log|meal): list_history, \
                 get_history_entry, history_stats, history_by_day, clear_history. \
                 Service: status."
                    .into(),
            ),
        }
    }
}
