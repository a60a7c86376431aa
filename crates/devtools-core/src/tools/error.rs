//! Tool error types

use thiserror::Error;

use crate::types::ToolResult;

/// Errors a tool handler can raise
///
/// The registry turns every error into a failed [`ToolResult`] whose `error`
/// is the `Display` text, so messages are written for the end user.
#[derive(Error, Debug)]
pub enum ToolError {
    /// Input the tool cannot work with
    #[error("{0}")]
    InvalidInput(String),

    /// An option value the tool does not support
    #[error("Unsupported {kind}: {value}")]
    Unsupported { kind: &'static str, value: String },

    /// JSON parsing error
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("{0}")]
    Yaml(#[from] serde_yaml::Error),

    /// CSV parsing error
    #[error("{0}")]
    Csv(#[from] csv::Error),

    /// XML parsing error
    #[error("{0}")]
    Xml(#[from] quick_xml::Error),

    /// Failure inside a backing library
    #[error("{0}")]
    Other(String),
}

impl ToolError {
    /// Create an invalid input error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create an unsupported option error
    pub fn unsupported(kind: &'static str, value: impl Into<String>) -> Self {
        Self::Unsupported {
            kind,
            value: value.into(),
        }
    }

    /// Wrap any displayable library error
    pub fn other(err: impl std::fmt::Display) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<ToolError> for ToolResult {
    fn from(err: ToolError) -> Self {
        ToolResult::failure(err.to_string())
    }
}

/// Result type returned by tool handlers
pub type HandlerResult = Result<ToolResult, ToolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_user_facing() {
        assert_eq!(
            ToolError::unsupported("format", "toml").to_string(),
            "Unsupported format: toml"
        );
        assert_eq!(ToolError::invalid("Input is required").to_string(), "Input is required");

        let result: ToolResult = ToolError::other("boom").into();
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("boom"));
    }
}
