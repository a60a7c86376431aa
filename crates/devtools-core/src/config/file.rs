//! File-based configuration provider (YAML)
//!
//! Supports user-level (~/.config/developertools/config.yaml) and
//! workspace-level (.config/developertools/config.yaml) config.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::ToolOptions;
use super::traits::{ConfigError, ConfigProvider, ConfigResult};

/// Configuration file structure
///
/// ```yaml
/// disabled:
///   - lorem:generate
/// enabled:
///   - jwt
/// defaults:
///   hash:generator:
///     algorithm: sha512
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ConfigFile {
    /// Tools hidden from the sidebar
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub disabled: Vec<String>,

    /// Tools re-enabled here though a lower level disables them
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enabled: Vec<String>,

    /// Per-tool option defaults
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub defaults: BTreeMap<String, ToolOptions>,
}

/// Config level (user or workspace)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLevel {
    /// User-level config (~/.config/developertools/config.yaml)
    User,
    /// Workspace-level config (.config/developertools/config.yaml in workspace root)
    Workspace,
}

impl ConfigLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigLevel::User => "user",
            ConfigLevel::Workspace => "workspace",
        }
    }
}

/// File-based configuration provider
///
/// Reads and writes configuration from YAML files.
///
/// # Example
///
/// ```no_run
/// use devtools_core::config::FileConfigProvider;
///
/// // User-level config
/// let user_config = FileConfigProvider::user();
///
/// // Workspace-level config
/// let workspace_config = FileConfigProvider::workspace("/path/to/workspace");
/// ```
pub struct FileConfigProvider {
    path: PathBuf,
    level: ConfigLevel,
    cache: RwLock<Option<ConfigFile>>,
}

impl FileConfigProvider {
    /// Create a new file config provider for a specific path
    pub fn new(path: impl Into<PathBuf>, level: ConfigLevel) -> Self {
        Self {
            path: path.into(),
            level,
            cache: RwLock::new(None),
        }
    }

    /// Create a user-level config provider
    pub fn user() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"));
        let path = config_dir.join("developertools").join("config.yaml");
        Self::new(path, ConfigLevel::User)
    }

    /// Create a workspace-level config provider
    pub fn workspace(workspace_root: impl AsRef<Path>) -> Self {
        let path = workspace_root
            .as_ref()
            .join(".config")
            .join("developertools")
            .join("config.yaml");
        Self::new(path, ConfigLevel::Workspace)
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the config level
    pub fn level(&self) -> ConfigLevel {
        self.level
    }

    /// Check if the config file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn load(&self) -> ConfigResult<ConfigFile> {
        if !self.path.exists() {
            return Ok(ConfigFile::default());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(ConfigFile::default());
        }
        Ok(serde_yaml::from_str(&content)?)
    }

    fn save(&self, config: &ConfigFile) -> ConfigResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(config)?;
        fs::write(&self.path, content)?;

        *self.cache.write() = Some(config.clone());
        Ok(())
    }

    /// Get cached or load config
    pub fn config(&self) -> ConfigResult<ConfigFile> {
        if let Some(config) = self.cache.read().as_ref() {
            return Ok(config.clone());
        }

        let config = self.load()?;
        *self.cache.write() = Some(config.clone());
        Ok(config)
    }

    /// Reload config from disk (invalidate cache)
    pub fn reload(&self) -> ConfigResult<ConfigFile> {
        let config = self.load()?;
        *self.cache.write() = Some(config.clone());
        Ok(config)
    }

    /// Create a backup of the current config file
    pub fn backup(&self) -> ConfigResult<Option<PathBuf>> {
        if !self.exists() {
            return Ok(None);
        }

        let backup_path = self.path.with_extension("yaml.backup");
        fs::copy(&self.path, &backup_path)?;
        Ok(Some(backup_path))
    }

    /// Export config as JSON
    pub fn export_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(&self.config()?)?)
    }

    /// Replace config with JSON content
    pub fn import_json(&self, json: &str) -> ConfigResult<()> {
        let config: ConfigFile = serde_json::from_str(json)
            .map_err(|e| ConfigError::Other(format!("Failed to parse JSON: {}", e)))?;
        self.save(&config)
    }
}

impl std::fmt::Debug for FileConfigProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileConfigProvider")
            .field("path", &self.path)
            .field("level", &self.level)
            .field("exists", &self.exists())
            .finish()
    }
}

impl ConfigProvider for FileConfigProvider {
    fn tool_defaults(&self, tool: &str) -> ToolOptions {
        self.config()
            .ok()
            .and_then(|mut c| c.defaults.remove(tool))
            .unwrap_or_default()
    }

    fn disabled_tools(&self) -> Vec<String> {
        self.config().map(|c| c.disabled).unwrap_or_default()
    }

    fn enabled_tools(&self) -> Vec<String> {
        self.config().map(|c| c.enabled).unwrap_or_default()
    }

    fn set_tool_default(&self, tool: &str, option: &str, value: Value) -> ConfigResult<()> {
        let mut config = self.config()?;
        let current = config.defaults.remove(tool).unwrap_or_default();
        config.defaults.insert(tool.to_string(), current.with(option, value));
        self.save(&config)
    }

    fn set_tool_enabled(&self, tool: &str, enabled: bool) -> ConfigResult<()> {
        let mut config = self.config()?;
        config.disabled.retain(|id| id != tool);
        config.enabled.retain(|id| id != tool);
        if enabled {
            config.enabled.push(tool.to_string());
        } else {
            config.disabled.push(tool.to_string());
        }
        self.save(&config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_file_config_provider() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let provider = FileConfigProvider::new(&path, ConfigLevel::User);

        // Initially empty
        assert!(!provider.exists());
        assert!(provider.disabled_tools().is_empty());

        provider.set_tool_enabled("barcode:generate", false).unwrap();
        provider
            .set_tool_default("uuid:generate", "count", json!(5))
            .unwrap();

        // File should exist now
        assert!(provider.exists());

        // Reload and verify persistence
        provider.reload().unwrap();
        assert!(provider.is_disabled("barcode:generate"));
        assert_eq!(provider.tool_defaults("uuid:generate").count_or("count", 1), 5);

        provider.set_tool_enabled("barcode:generate", true).unwrap();
        provider.reload().unwrap();
        assert!(!provider.is_disabled("barcode:generate"));
        assert_eq!(provider.enabled_tools(), vec!["barcode:generate".to_string()]);
        assert!(fs::read_to_string(&path).unwrap().contains("enabled:"));
    }

    #[test]
    fn test_reads_hand_written_yaml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "disabled:\n  - lorem:generate\ndefaults:\n  hash:generator:\n    algorithm: sha512\n    uppercase: true\n",
        )
        .unwrap();

        let provider = FileConfigProvider::new(&path, ConfigLevel::Workspace);
        let defaults = provider.tool_defaults("hash:generator");
        assert_eq!(defaults.str("algorithm"), Some("sha512"));
        assert!(defaults.flag("uppercase", false));
        assert_eq!(provider.disabled_tools(), vec!["lorem:generate".to_string()]);
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "disabled: [unclosed").unwrap();

        let provider = FileConfigProvider::new(&path, ConfigLevel::User);
        assert!(matches!(provider.config(), Err(ConfigError::Yaml(_))));
        assert!(provider.disabled_tools().is_empty());
    }

    #[test]
    fn test_workspace_path() {
        let provider = FileConfigProvider::workspace("/tmp/project");
        assert_eq!(provider.level(), ConfigLevel::Workspace);
        assert!(provider.path().ends_with(".config/developertools/config.yaml"));
    }

    #[test]
    fn test_backup() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let provider = FileConfigProvider::new(&path, ConfigLevel::User);

        // No backup if file doesn't exist
        assert!(provider.backup().unwrap().is_none());

        fs::write(&path, "disabled: []").unwrap();

        let backup_path = provider.backup().unwrap().unwrap();
        assert!(backup_path.exists());
        assert!(backup_path.to_string_lossy().contains("backup"));
    }
}
