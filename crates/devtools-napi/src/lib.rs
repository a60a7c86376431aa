//! Node.js bindings for Developer Tools via napi-rs

#![deny(clippy::all)]

use napi::bindgen_prelude::*;
use napi_derive::napi;
use std::sync::Arc;

use devtools_core::config::{
    ConfigProvider as CoreConfigProvider,
    FileConfigProvider as CoreFileConfigProvider,
    LayeredConfigProvider as CoreLayeredConfigProvider,
};
use devtools_core::logging::{self, FileLogger};
use devtools_core::tools::{global_registry, ToolManager as CoreToolManager};
use devtools_core::types::{
    ToolMetadata as CoreToolMetadata,
    ToolOptions as CoreToolOptions,
    ToolResult as CoreToolResult,
};
use devtools_core::webview::MessageRouter as CoreMessageRouter;

const LOG_MODULE: &str = "napi";

// ============================================================================
// Tool Types
// ============================================================================

/// Result of a tool run
#[napi(object)]
pub struct ToolResult {
    pub success: bool,
    pub output: Option<String>,
    pub error: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

impl From<CoreToolResult> for ToolResult {
    fn from(result: CoreToolResult) -> Self {
        Self {
            success: result.success,
            output: result.output,
            error: result.error,
            metadata: result.metadata.map(serde_json::Value::Object),
        }
    }
}

/// Sidebar metadata of a registered tool
#[napi(object)]
pub struct ToolInfo {
    pub id: String,
    pub name: String,
    pub category: String,
    pub has_input: bool,
    pub placeholder: Option<String>,
    /// Option form definitions, as the webview consumes them
    pub options: Option<serde_json::Value>,
}

impl From<CoreToolMetadata> for ToolInfo {
    fn from(meta: CoreToolMetadata) -> Self {
        let options = meta
            .options
            .and_then(|options| serde_json::to_value(options).ok());
        Self {
            id: meta.id,
            name: meta.name,
            category: meta.category,
            has_input: meta.has_input,
            placeholder: meta.placeholder,
            options,
        }
    }
}

fn to_options(options: Option<serde_json::Value>) -> CoreToolOptions {
    options.map(CoreToolOptions::from_value).unwrap_or_default()
}

/// Run a blocking tool call off the JS thread
async fn run_blocking<F>(job: F) -> Result<ToolResult>
where
    F: FnOnce() -> CoreToolResult + Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map(ToolResult::from)
        .map_err(|e| Error::from_reason(format!("Task join error: {}", e)))
}

// ============================================================================
// Global Registry
// ============================================================================

/// Run a tool from the built-in catalog
#[napi]
pub async fn execute_tool(
    tool: String,
    input: String,
    options: Option<serde_json::Value>,
) -> Result<ToolResult> {
    logging::debug(LOG_MODULE, &format!("executeTool {}", tool));
    let options = to_options(options);
    run_blocking(move || global_registry().execute(&tool, &input, &options)).await
}

/// Metadata of every built-in tool, in sidebar order
#[napi]
pub fn get_all_tool_metadata() -> Vec<ToolInfo> {
    global_registry().metadata().into_iter().map(ToolInfo::from).collect()
}

/// Handle a webview message against the built-in catalog without configuration
#[napi]
pub fn handle_webview_message(message: serde_json::Value) -> Option<serde_json::Value> {
    default_devtools().handle_message(message)
}

fn default_devtools() -> DevTools {
    DevTools::from_config(Arc::new(CoreFileConfigProvider::user()))
}

// ============================================================================
// DevTools
// ============================================================================

/// Catalog bound to user and (optionally) workspace configuration
#[napi]
pub struct DevTools {
    router: Arc<CoreMessageRouter>,
    config: Arc<dyn CoreConfigProvider>,
}

impl DevTools {
    fn from_config(config: Arc<dyn CoreConfigProvider>) -> Self {
        let logger = Arc::new(FileLogger::new(LOG_MODULE));
        let manager = CoreToolManager::new(global_registry(), config.clone())
            .with_logger(logger.clone());
        let router = CoreMessageRouter::new(Arc::new(manager)).with_logger(logger);
        Self {
            router: Arc::new(router),
            config,
        }
    }
}

#[napi]
impl DevTools {
    /// Workspace settings, when a root is given, override user settings
    #[napi(constructor)]
    pub fn new(workspace_root: Option<String>) -> Self {
        let user: Arc<dyn CoreConfigProvider> = Arc::new(CoreFileConfigProvider::user());
        let config: Arc<dyn CoreConfigProvider> = match workspace_root {
            Some(root) => Arc::new(CoreLayeredConfigProvider::new(
                user,
                Arc::new(CoreFileConfigProvider::workspace(root)),
            )),
            None => user,
        };
        Self::from_config(config)
    }

    /// Run a tool with configured defaults applied
    #[napi]
    pub async fn execute(
        &self,
        tool: String,
        input: String,
        options: Option<serde_json::Value>,
    ) -> Result<ToolResult> {
        let router = self.router.clone();
        let options = to_options(options);
        run_blocking(move || router.manager().execute(&tool, &input, &options)).await
    }

    /// Metadata of enabled tools
    #[napi]
    pub fn get_tool_metadata(&self) -> Vec<ToolInfo> {
        self.router
            .manager()
            .metadata()
            .into_iter()
            .map(ToolInfo::from)
            .collect()
    }

    /// Answer a webview message; `null` when no reply is due
    #[napi]
    pub fn handle_message(&self, message: serde_json::Value) -> Option<serde_json::Value> {
        let reply = self.router.handle(message)?;
        match serde_json::to_value(reply) {
            Ok(value) => Some(value),
            Err(e) => {
                logging::error(LOG_MODULE, &format!("Failed to serialize reply: {}", e));
                None
            }
        }
    }

    #[napi]
    pub fn set_tool_enabled(&self, tool: String, enabled: bool) -> Result<()> {
        self.config
            .set_tool_enabled(&tool, enabled)
            .map_err(|e| Error::from_reason(e.to_string()))
    }

    #[napi]
    pub fn set_tool_default(&self, tool: String, option: String, value: serde_json::Value) -> Result<()> {
        self.config
            .set_tool_default(&tool, &option, value)
            .map_err(|e| Error::from_reason(e.to_string()))
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Path of the user or workspace configuration file
#[napi]
pub fn get_config_path(workspace_root: Option<String>) -> String {
    let provider = match workspace_root {
        Some(root) => CoreFileConfigProvider::workspace(root),
        None => CoreFileConfigProvider::user(),
    };
    provider.path().to_string_lossy().to_string()
}

// ============================================================================
// Debug Logging
// ============================================================================

/// Get the path to the debug log file
#[napi]
pub fn get_log_file_path() -> String {
    logging::log_file_path().to_string_lossy().to_string()
}

/// Clear the debug log file
#[napi]
pub fn clear_log() {
    logging::clear_log();
}

/// Write a message to the debug log
#[napi]
pub fn debug_log(module: String, message: String) {
    logging::info(&module, &message);
}
