//! Dispatch of webview messages to the tool manager

use std::sync::Arc;

use serde_json::Value;

use crate::logging::{NoOpLogger, SharedLogger};
use crate::{log_debug, log_error, log_warn};
use crate::tools::ToolManager;
use crate::types::ToolResult;
use super::messages::{InboundMessage, OutboundMessage};

/// Turns inbound webview messages into replies
///
/// Messages the sidebar does not expect an answer to yield `None`.
pub struct MessageRouter {
    manager: Arc<ToolManager>,
    logger: SharedLogger,
}

impl MessageRouter {
    pub fn new(manager: Arc<ToolManager>) -> Self {
        Self {
            manager,
            logger: Arc::new(NoOpLogger),
        }
    }

    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn manager(&self) -> &Arc<ToolManager> {
        &self.manager
    }

    /// Handle a typed message
    pub fn dispatch(&self, message: InboundMessage) -> OutboundMessage {
        match message {
            InboundMessage::UiReady => OutboundMessage::ToolsMetadata {
                tools: self.manager.metadata(),
            },
            InboundMessage::ToolExecute { tool, data } => {
                log_debug!(self.logger, "[MessageRouter] Executing {}", tool);
                let result = self.manager.execute(&tool, data.input(), &data.options());
                OutboundMessage::ToolResult { tool, result }
            }
        }
    }

    /// Handle a raw JSON message
    pub fn handle(&self, message: Value) -> Option<OutboundMessage> {
        let kind = message
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        if kind != "ui:ready" && kind != "tool:execute" {
            log_warn!(self.logger, "[MessageRouter] Unknown message type: {}", kind);
            return None;
        }

        // Recover the tool id before the full parse so a bad payload can still be answered
        let tool = message
            .get("tool")
            .and_then(Value::as_str)
            .map(str::to_string);

        match serde_json::from_value::<InboundMessage>(message) {
            Ok(inbound) => Some(self.dispatch(inbound)),
            Err(e) => {
                log_warn!(self.logger, "[MessageRouter] Malformed {} message: {}", kind, e);
                tool.map(|tool| OutboundMessage::ToolResult {
                    tool,
                    result: ToolResult::failure(format!("Invalid message: {}", e)),
                })
            }
        }
    }

    /// Handle a JSON text message and serialize the reply
    pub fn handle_json(&self, text: &str) -> Option<String> {
        let message = match serde_json::from_str::<Value>(text) {
            Ok(message) => message,
            Err(e) => {
                log_warn!(self.logger, "[MessageRouter] Unparseable message: {}", e);
                return None;
            }
        };

        let reply = self.handle(message)?;
        match serde_json::to_string(&reply) {
            Ok(json) => Some(json),
            Err(e) => {
                log_error!(self.logger, "[MessageRouter] Failed to serialize reply: {}", e);
                None
            }
        }
    }
}
