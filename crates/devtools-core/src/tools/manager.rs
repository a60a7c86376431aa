//! Config-aware front end over the tool registry

use std::sync::Arc;

use crate::config::ConfigProvider;
use crate::logging::{NoOpLogger, SharedLogger};
use crate::types::{ToolMetadata, ToolOptions, ToolResult};
use super::registry::ToolRegistry;

/// Applies user/workspace configuration on top of a [`ToolRegistry`]:
/// disabled tools are hidden and rejected, configured option defaults sit
/// beneath the options sent with each request.
pub struct ToolManager {
    registry: Arc<ToolRegistry>,
    config: Arc<dyn ConfigProvider>,
    logger: SharedLogger,
}

impl ToolManager {
    pub fn new(registry: Arc<ToolRegistry>, config: Arc<dyn ConfigProvider>) -> Self {
        Self {
            registry,
            config,
            logger: Arc::new(NoOpLogger),
        }
    }

    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &Arc<dyn ConfigProvider> {
        &self.config
    }

    /// Metadata of enabled tools, with configured defaults applied to the form
    pub fn metadata(&self) -> Vec<ToolMetadata> {
        let disabled = self.config.disabled_tools();
        self.registry
            .metadata()
            .into_iter()
            .filter(|meta| !disabled.contains(&meta.id))
            .map(|meta| self.apply_defaults(meta))
            .collect()
    }

    /// Run a tool with configured defaults beneath the request options
    pub fn execute(&self, id: &str, input: &str, options: &ToolOptions) -> ToolResult {
        if self.config.is_disabled(id) {
            self.logger
                .info(&format!("[ToolManager] Rejected disabled tool {}", id));
            return ToolResult::failure(format!("Tool \"{}\" is disabled", id));
        }

        let defaults = self.config.tool_defaults(id);
        if defaults.is_empty() {
            return self.registry.execute(id, input, options);
        }

        self.logger.debug(&format!(
            "[ToolManager] Applying {} configured default(s) to {}",
            defaults.iter().count(),
            id
        ));
        self.registry.execute(id, input, &options.merged_over(&defaults))
    }

    fn apply_defaults(&self, mut meta: ToolMetadata) -> ToolMetadata {
        let defaults = self.config.tool_defaults(&meta.id);
        if let Some(options) = meta.options.as_mut() {
            for option in options.iter_mut() {
                if let Some(value) = defaults.get(&option.id) {
                    option.default_value = Some(value.clone());
                }
            }
        }
        meta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryConfigProvider;
    use crate::types::ToolOption;

    fn manager(config: MemoryConfigProvider) -> ToolManager {
        let registry = ToolRegistry::default();
        registry.register(
            ToolMetadata::new("greet")
                .with_options(vec![ToolOption::text("greeting", "Greeting", "Hello")]),
            |input, options| {
                Ok(ToolResult::success(format!(
                    "{}, {}",
                    options.str_or("greeting", "Hello"),
                    input
                )))
            },
        );
        registry.register(ToolMetadata::new("other"), |_, _| Ok(ToolResult::success("")));
        ToolManager::new(Arc::new(registry), Arc::new(config))
    }

    #[test]
    fn test_configured_defaults_apply() {
        let config = MemoryConfigProvider::new()
            .with_defaults("greet", ToolOptions::new().with("greeting", "Hi"));
        let manager = manager(config);

        let result = manager.execute("greet", "Ana", &ToolOptions::new());
        assert_eq!(result.output_str(), "Hi, Ana");

        // Request options still win
        let result = manager.execute("greet", "Ana", &ToolOptions::new().with("greeting", "Hey"));
        assert_eq!(result.output_str(), "Hey, Ana");

        let meta = manager.metadata();
        let option = meta[0].option("greeting").unwrap();
        assert_eq!(option.default_value, Some(serde_json::json!("Hi")));
    }

    #[test]
    fn test_disabled_tools_are_hidden_and_rejected() {
        let manager = manager(MemoryConfigProvider::new().with_disabled("other"));

        let ids: Vec<_> = manager.metadata().into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["greet".to_string()]);

        let result = manager.execute("other", "", &ToolOptions::new());
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Tool \"other\" is disabled"));
    }
}
