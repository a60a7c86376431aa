//! Messages exchanged with the sidebar webview

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{ToolMetadata, ToolOptions, ToolResult};

/// Payload of a `tool:execute` message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

impl ExecutePayload {
    /// Input text, empty when the webview sent none
    pub fn input(&self) -> &str {
        self.input.as_deref().unwrap_or_default()
    }

    /// Options object; anything but an object counts as no options
    pub fn options(&self) -> ToolOptions {
        self.options
            .clone()
            .map(ToolOptions::from_value)
            .unwrap_or_default()
    }
}

/// Message sent by the webview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InboundMessage {
    /// The sidebar finished loading and wants the tool list
    #[serde(rename = "ui:ready")]
    UiReady,
    /// Run a tool
    #[serde(rename = "tool:execute")]
    ToolExecute {
        tool: String,
        #[serde(default)]
        data: ExecutePayload,
    },
}

/// Message posted back to the webview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OutboundMessage {
    #[serde(rename = "tools:metadata")]
    ToolsMetadata { tools: Vec<ToolMetadata> },
    #[serde(rename = "tool:result")]
    ToolResult { tool: String, result: ToolResult },
}

impl OutboundMessage {
    /// Tool id a `tool:result` reply belongs to
    pub fn tool(&self) -> Option<&str> {
        match self {
            OutboundMessage::ToolResult { tool, .. } => Some(tool),
            OutboundMessage::ToolsMetadata { .. } => None,
        }
    }
}
