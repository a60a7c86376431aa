//! Webview message protocol
//!
//! The sidebar posts `ui:ready` once loaded and `tool:execute` for every
//! run; the host answers with `tools:metadata` and `tool:result`.

mod messages;
mod router;

pub use messages::{ExecutePayload, InboundMessage, OutboundMessage};
pub use router::MessageRouter;
