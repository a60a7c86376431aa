//! UI metadata describing a registered tool and its option form

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of form control the sidebar renders for an option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Select,
    Checkbox,
    Number,
    Text,
    Textarea,
    Color,
}

/// A label/value pair offered by a select option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub label: String,
    pub value: String,
}

impl Choice {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// A single option of a tool form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolOption {
    /// Key used in the options object sent with `tool:execute`
    pub id: String,
    /// Label shown in the UI
    pub label: String,
    /// Form control type
    #[serde(rename = "type")]
    pub kind: OptionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<Choice>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl ToolOption {
    fn new(id: &str, label: &str, kind: OptionKind) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            kind,
            default_value: None,
            options: None,
            min: None,
            max: None,
            rows: None,
            placeholder: None,
        }
    }

    /// Select box from `(label, value)` pairs
    pub fn select(id: &str, label: &str, default: &str, choices: &[(&str, &str)]) -> Self {
        let mut option = Self::new(id, label, OptionKind::Select);
        option.default_value = Some(Value::from(default));
        option.options = Some(
            choices
                .iter()
                .map(|(label, value)| Choice::new(*label, *value))
                .collect(),
        );
        option
    }

    /// Checkbox
    pub fn checkbox(id: &str, label: &str, default: bool) -> Self {
        let mut option = Self::new(id, label, OptionKind::Checkbox);
        option.default_value = Some(Value::from(default));
        option
    }

    /// Number input
    pub fn number(id: &str, label: &str, default: i64) -> Self {
        let mut option = Self::new(id, label, OptionKind::Number);
        option.default_value = Some(Value::from(default));
        option
    }

    /// Single-line text input
    pub fn text(id: &str, label: &str, default: &str) -> Self {
        let mut option = Self::new(id, label, OptionKind::Text);
        option.default_value = Some(Value::from(default));
        option
    }

    /// Multi-line text input
    pub fn textarea(id: &str, label: &str, rows: u32) -> Self {
        let mut option = Self::new(id, label, OptionKind::Textarea);
        option.default_value = Some(Value::from(""));
        option.rows = Some(rows);
        option
    }

    /// Color picker
    pub fn color(id: &str, label: &str, default: &str) -> Self {
        let mut option = Self::new(id, label, OptionKind::Color);
        option.default_value = Some(Value::from(default));
        option
    }

    /// Bound a number input
    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }

    pub fn with_rows(mut self, rows: u32) -> Self {
        self.rows = Some(rows);
        self
    }
}

/// Metadata for a registered tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolMetadata {
    /// Registry key
    pub id: String,
    /// Display name
    pub name: String,
    /// Sidebar group
    pub category: String,
    /// Whether the tool reads the main input box
    pub has_input: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<ToolOption>>,
}

impl ToolMetadata {
    /// Metadata with the registry defaults: category `Other`, input enabled, name = id
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            category: "Other".to_string(),
            has_input: true,
            placeholder: None,
            options: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn in_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Mark the tool as option-driven (no main input box)
    pub fn without_input(mut self) -> Self {
        self.has_input = false;
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_options(mut self, options: Vec<ToolOption>) -> Self {
        self.options = Some(options);
        self
    }

    /// Find an option by id
    pub fn option(&self, id: &str) -> Option<&ToolOption> {
        self.options.as_ref()?.iter().find(|o| o.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_metadata_defaults() {
        let meta = ToolMetadata::new("custom:tool");
        assert_eq!(meta.name, "custom:tool");
        assert_eq!(meta.category, "Other");
        assert!(meta.has_input);
    }

    #[test]
    fn test_option_serializes_for_webview() {
        let option = ToolOption::select("mode", "Mode", "encode", &[("Encode", "encode")]);
        let value = serde_json::to_value(&option).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "mode",
                "label": "Mode",
                "type": "select",
                "defaultValue": "encode",
                "options": [{ "label": "Encode", "value": "encode" }]
            })
        );
    }

    #[test]
    fn test_number_range() {
        let option = ToolOption::number("count", "Count", 1).range(1.0, 100.0);
        assert_eq!(option.min, Some(1.0));
        assert_eq!(option.max, Some(100.0));
        assert_eq!(option.kind, OptionKind::Number);
    }
}
