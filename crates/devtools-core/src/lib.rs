//! Developer Tools Core
//!
//! Runtime-agnostic catalog of developer utilities: encoders, hashes,
//! generators, JSON tools, text and data converters, formatters and
//! inspectors. The crate can be used from any environment (Node.js via
//! napi-rs, Python via PyO3, native CLI, etc.)
//!
//! ## Running tools
//!
//! Every tool is registered under a string id. The built-in catalog is
//! available through a shared registry:
//!
//! ```rust,ignore
//! use devtools_core::{execute_tool, ToolOptions};
//!
//! let result = execute_tool("base64", "Hello", &ToolOptions::new());
//! assert_eq!(result.output.as_deref(), Some("SGVsbG8="));
//! ```
//!
//! The sidebar talks to the host through [`webview::MessageRouter`], which
//! applies user and workspace configuration via [`tools::ToolManager`].

pub mod types;
pub mod logging;
pub mod config;
pub mod tools;
pub mod webview;

// Re-export commonly used types
pub use types::{Choice, OptionKind, ToolMetadata, ToolOption, ToolOptions, ToolResult};

pub use logging::{Logger, NoOpLogger, ConsoleLogger, SharedLogger};

pub use config::{
    ConfigProvider, ConfigError, ConfigResult,
    MemoryConfigProvider, FileConfigProvider, LayeredConfigProvider, ConfigLevel,
};

pub use tools::{
    ToolError, HandlerResult, ToolHandler, ToolRegistry, ToolManager,
    builtin_registry, global_registry, register_tool, execute_tool, list_tools,
};

pub use webview::{InboundMessage, OutboundMessage, MessageRouter};
