//! Core types shared by the registry, the tools and the bindings

mod tool;
mod options;
mod metadata;

pub use tool::ToolResult;
pub use options::ToolOptions;
pub use metadata::{Choice, OptionKind, ToolMetadata, ToolOption};
