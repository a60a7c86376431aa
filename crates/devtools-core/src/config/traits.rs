//! Configuration provider trait

use serde_json::Value;

use crate::types::ToolOptions;

/// Configuration provider abstraction
///
/// Implementations:
/// - `MemoryConfigProvider`: In-memory for testing
/// - `FileConfigProvider`: Reads from a YAML file (~/.config/developertools/config.yaml)
/// - `LayeredConfigProvider`: Workspace settings over user settings
pub trait ConfigProvider: Send + Sync {
    /// Option defaults configured for a tool (empty when none)
    fn tool_defaults(&self, tool: &str) -> ToolOptions;

    /// Ids of tools hidden from the sidebar
    fn disabled_tools(&self) -> Vec<String>;

    /// Ids of tools explicitly enabled at this level; they cancel a disable
    /// inherited from a lower level
    fn enabled_tools(&self) -> Vec<String>;

    /// Set a single option default for a tool
    fn set_tool_default(&self, tool: &str, option: &str, value: Value) -> ConfigResult<()>;

    /// Enable or disable a tool
    fn set_tool_enabled(&self, tool: &str, enabled: bool) -> ConfigResult<()>;

    /// Whether a tool is disabled
    fn is_disabled(&self, tool: &str) -> bool {
        self.disabled_tools().iter().any(|id| id == tool)
    }
}

/// Errors that can occur during configuration operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Other(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
