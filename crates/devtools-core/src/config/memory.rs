//! In-memory configuration provider

use std::collections::HashMap;

use parking_lot::RwLock;
use serde_json::Value;

use crate::types::ToolOptions;
use super::traits::{ConfigProvider, ConfigResult};

/// In-memory configuration provider for testing
#[derive(Debug, Default)]
pub struct MemoryConfigProvider {
    defaults: RwLock<HashMap<String, ToolOptions>>,
    disabled: RwLock<Vec<String>>,
    enabled: RwLock<Vec<String>>,
}

impl MemoryConfigProvider {
    /// Create a new empty memory config provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed option defaults for a tool
    pub fn with_defaults(self, tool: &str, defaults: ToolOptions) -> Self {
        self.defaults.write().insert(tool.to_string(), defaults);
        self
    }

    /// Seed a disabled tool
    pub fn with_disabled(self, tool: &str) -> Self {
        self.disabled.write().push(tool.to_string());
        self
    }

    /// Clear all settings
    pub fn clear(&self) {
        self.defaults.write().clear();
        self.disabled.write().clear();
        self.enabled.write().clear();
    }
}

impl ConfigProvider for MemoryConfigProvider {
    fn tool_defaults(&self, tool: &str) -> ToolOptions {
        self.defaults.read().get(tool).cloned().unwrap_or_default()
    }

    fn disabled_tools(&self) -> Vec<String> {
        self.disabled.read().clone()
    }

    fn enabled_tools(&self) -> Vec<String> {
        self.enabled.read().clone()
    }

    fn set_tool_default(&self, tool: &str, option: &str, value: Value) -> ConfigResult<()> {
        let mut guard = self.defaults.write();
        let current = guard.remove(tool).unwrap_or_default();
        guard.insert(tool.to_string(), current.with(option, value));
        Ok(())
    }

    fn set_tool_enabled(&self, tool: &str, enabled: bool) -> ConfigResult<()> {
        let mut disabled = self.disabled.write();
        let mut explicit = self.enabled.write();
        disabled.retain(|id| id != tool);
        explicit.retain(|id| id != tool);
        if enabled {
            explicit.push(tool.to_string());
        } else {
            disabled.push(tool.to_string());
        }
        Ok(())
    }
}
