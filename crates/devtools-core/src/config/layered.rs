//! Workspace-over-user configuration

use std::sync::Arc;

use serde_json::Value;

use crate::types::ToolOptions;
use super::traits::{ConfigProvider, ConfigResult};

/// Combines two providers: the override layer (workspace) wins over the base
/// layer (user). Writes go to the override layer.
pub struct LayeredConfigProvider {
    base: Arc<dyn ConfigProvider>,
    overlay: Arc<dyn ConfigProvider>,
}

impl LayeredConfigProvider {
    pub fn new(base: Arc<dyn ConfigProvider>, overlay: Arc<dyn ConfigProvider>) -> Self {
        Self { base, overlay }
    }
}

impl ConfigProvider for LayeredConfigProvider {
    fn tool_defaults(&self, tool: &str) -> ToolOptions {
        self.overlay
            .tool_defaults(tool)
            .merged_over(&self.base.tool_defaults(tool))
    }

    fn disabled_tools(&self) -> Vec<String> {
        let enabled = self.overlay.enabled_tools();
        let mut disabled: Vec<String> = self
            .base
            .disabled_tools()
            .into_iter()
            .filter(|id| !enabled.contains(id))
            .collect();
        for id in self.overlay.disabled_tools() {
            if !disabled.contains(&id) {
                disabled.push(id);
            }
        }
        disabled
    }

    fn enabled_tools(&self) -> Vec<String> {
        let disabled = self.overlay.disabled_tools();
        let mut enabled = self.overlay.enabled_tools();
        for id in self.base.enabled_tools() {
            if !disabled.contains(&id) && !enabled.contains(&id) {
                enabled.push(id);
            }
        }
        enabled
    }

    fn set_tool_default(&self, tool: &str, option: &str, value: Value) -> ConfigResult<()> {
        self.overlay.set_tool_default(tool, option, value)
    }

    fn set_tool_enabled(&self, tool: &str, enabled: bool) -> ConfigResult<()> {
        self.overlay.set_tool_enabled(tool, enabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryConfigProvider;
    use serde_json::json;

    #[test]
    fn test_overlay_wins() {
        let user = Arc::new(
            MemoryConfigProvider::new()
                .with_defaults(
                    "hash:generator",
                    ToolOptions::new().with("algorithm", "sha1").with("uppercase", true),
                )
                .with_disabled("lorem:generate"),
        );
        let workspace = Arc::new(
            MemoryConfigProvider::new()
                .with_defaults("hash:generator", ToolOptions::new().with("algorithm", "md5"))
                .with_disabled("jwt"),
        );
        let layered = LayeredConfigProvider::new(user, workspace.clone());

        let defaults = layered.tool_defaults("hash:generator");
        assert_eq!(defaults.str("algorithm"), Some("md5"));
        assert!(defaults.flag("uppercase", false));
        assert_eq!(
            layered.disabled_tools(),
            vec!["lorem:generate".to_string(), "jwt".to_string()]
        );

        layered.set_tool_default("uuid:generate", "version", json!("1")).unwrap();
        assert_eq!(workspace.tool_defaults("uuid:generate").str("version"), Some("1"));
    }

    #[test]
    fn test_overlay_can_reenable_a_base_disable() {
        let user = Arc::new(MemoryConfigProvider::new().with_disabled("jwt"));
        let workspace = Arc::new(MemoryConfigProvider::new());
        let layered = LayeredConfigProvider::new(user.clone(), workspace.clone());
        assert!(layered.is_disabled("jwt"));

        layered.set_tool_enabled("jwt", true).unwrap();
        assert!(!layered.is_disabled("jwt"));
        assert!(layered.disabled_tools().is_empty());
        // the user level is untouched
        assert!(user.is_disabled("jwt"));
        assert_eq!(workspace.enabled_tools(), vec!["jwt".to_string()]);

        layered.set_tool_enabled("jwt", false).unwrap();
        assert!(layered.is_disabled("jwt"));
        assert!(layered.enabled_tools().is_empty());
    }
}
