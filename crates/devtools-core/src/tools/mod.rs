//! Developer tools
//!
//! Every tool is a plain function `(input, options) -> HandlerResult`
//! registered under a string id together with the metadata the sidebar
//! uses to render its form.
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Webview (sidebar)                          │
//! │    tool:list / tool:execute messages        │
//! └─────────────────────────────────────────────┘
//!           │
//!           ▼
//! ┌─────────────────────────────────────────────┐
//! │  ToolManager                                │
//! │    - hides disabled tools                   │
//! │    - layers configured option defaults      │
//! └─────────────────────────────────────────────┘
//!           │
//!           ▼
//! ┌─────────────────────────────────────────────┐
//! │  ToolRegistry                               │
//! │    id -> (ToolMetadata, handler)            │
//! └─────────────────────────────────────────────┘
//! ```

mod error;
mod registry;
mod manager;
mod support;
mod builtin;

pub mod encoding;
pub mod hash;
pub mod generators;
pub mod json;
pub mod text;
pub mod format;
pub mod units;
pub mod datetime;
pub mod color;
pub mod regex_tester;
pub mod certificate;

pub use error::{HandlerResult, ToolError};
pub use registry::{ToolHandler, ToolRegistry};
pub use manager::ToolManager;
pub use builtin::{
    builtin_registry, execute_tool, global_registry, list_tools, register_builtin, register_tool,
};
