//! String-keyed tool registry
//!
//! Tools are stored in registration order, which is the order the sidebar
//! lists them in. Registering an id twice replaces the earlier entry in place.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::logging::{NoOpLogger, SharedLogger};
use crate::types::{ToolMetadata, ToolOptions, ToolResult};
use super::error::HandlerResult;

/// Handler signature shared by every tool
pub type ToolHandler = Arc<dyn Fn(&str, &ToolOptions) -> HandlerResult + Send + Sync>;

#[derive(Clone)]
struct RegisteredTool {
    metadata: ToolMetadata,
    handler: ToolHandler,
}

/// Registry of tool handlers and their UI metadata
pub struct ToolRegistry {
    tools: RwLock<Vec<RegisteredTool>>,
    logger: SharedLogger,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new(logger: SharedLogger) -> Self {
        Self {
            tools: RwLock::new(Vec::new()),
            logger,
        }
    }

    /// Register a tool under `metadata.id`, replacing any previous registration
    pub fn register<F>(&self, metadata: ToolMetadata, handler: F)
    where
        F: Fn(&str, &ToolOptions) -> HandlerResult + Send + Sync + 'static,
    {
        let entry = RegisteredTool {
            metadata,
            handler: Arc::new(handler),
        };

        let mut tools = self.tools.write();
        match tools.iter().position(|t| t.metadata.id == entry.metadata.id) {
            Some(pos) => {
                self.logger
                    .debug(&format!("[ToolRegistry] Replacing tool {}", entry.metadata.id));
                tools[pos] = entry;
            }
            None => tools.push(entry),
        }
    }

    /// Remove a tool; returns whether it was registered
    pub fn unregister(&self, id: &str) -> bool {
        let mut tools = self.tools.write();
        let before = tools.len();
        tools.retain(|t| t.metadata.id != id);
        tools.len() != before
    }

    /// Run a tool. Unknown ids and handler errors become failed results.
    pub fn execute(&self, id: &str, input: &str, options: &ToolOptions) -> ToolResult {
        // Clone the handler out so the lock is not held while the tool runs
        let handler = self
            .tools
            .read()
            .iter()
            .find(|t| t.metadata.id == id)
            .map(|t| t.handler.clone());

        let Some(handler) = handler else {
            self.logger.warn(&format!("[ToolRegistry] Unknown tool: {}", id));
            return ToolResult::failure(format!("Tool \"{}\" not found", id));
        };

        match handler(input, options) {
            Ok(result) => result,
            Err(e) => {
                self.logger
                    .debug(&format!("[ToolRegistry] Tool {} failed: {}", id, e));
                e.into()
            }
        }
    }

    /// Metadata of every tool, in registration order
    pub fn metadata(&self) -> Vec<ToolMetadata> {
        self.tools.read().iter().map(|t| t.metadata.clone()).collect()
    }

    /// Metadata of a single tool
    pub fn get_metadata(&self, id: &str) -> Option<ToolMetadata> {
        self.tools
            .read()
            .iter()
            .find(|t| t.metadata.id == id)
            .map(|t| t.metadata.clone())
    }

    /// Whether a tool id is registered
    pub fn contains(&self, id: &str) -> bool {
        self.tools.read().iter().any(|t| t.metadata.id == id)
    }

    /// Registered tool ids, in registration order
    pub fn ids(&self) -> Vec<String> {
        self.tools.read().iter().map(|t| t.metadata.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.read().is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new(Arc::new(NoOpLogger))
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.ids())
            .finish()
    }
}
