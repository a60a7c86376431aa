//! Option bag passed from the UI to a tool handler

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Options sent along with a tool invocation
///
/// Values come straight from the sidebar form, so accessors treat "falsy"
/// values (missing, empty string, zero) as "use the default".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolOptions(Map<String, Value>);

impl ToolOptions {
    /// Create an empty option bag
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build options from a JSON value; anything but an object yields no options
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::new(),
        }
    }

    /// Set an option value
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Raw option value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Whether the option was sent at all
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Non-empty string option
    pub fn str(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    /// String option with a default for missing or empty values
    pub fn str_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.str(key).unwrap_or(default)
    }

    /// Numeric option; numeric strings are accepted, zero counts as unset
    pub fn number(&self, key: &str) -> Option<f64> {
        let value = match self.0.get(key)? {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        (value != 0.0 && value.is_finite()).then_some(value)
    }

    /// Numeric option with a default
    pub fn number_or(&self, key: &str, default: f64) -> f64 {
        self.number(key).unwrap_or(default)
    }

    /// Positive integer option with a default
    pub fn count_or(&self, key: &str, default: usize) -> usize {
        match self.number(key) {
            Some(n) if n >= 1.0 => n as usize,
            _ => default,
        }
    }

    /// Like [`count_or`](Self::count_or), clamped to `min..=max`
    pub fn count_in(&self, key: &str, default: usize, min: usize, max: usize) -> usize {
        self.count_or(key, default).clamp(min, max)
    }

    /// Boolean option; only an explicit boolean overrides the default
    pub fn flag(&self, key: &str, default: bool) -> bool {
        match self.0.get(key) {
            Some(Value::Bool(b)) => *b,
            _ => default,
        }
    }

    /// Layer these options over a set of defaults (these values win)
    pub fn merged_over(&self, defaults: &ToolOptions) -> ToolOptions {
        let mut merged = defaults.0.clone();
        for (key, value) in &self.0 {
            merged.insert(key.clone(), value.clone());
        }
        ToolOptions(merged)
    }

    /// Whether no options were sent
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the raw entries
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Convert back into a JSON value
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for ToolOptions {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
