//! Code, SQL and data formatters

mod markup;
mod printer;
mod script;
mod sql;
mod style;

pub use markup::format_markup;
pub use script::beautify as beautify_script;
pub use sql::{format as sql, format_sql, IndentStyle};
pub use style::beautify as beautify_style;

use serde_json::Value;

use crate::types::{ToolOptions, ToolResult};
use super::error::{HandlerResult, ToolError};
use super::support::to_pretty_json;

/// `format:code`
pub fn code(input: &str, options: &ToolOptions) -> HandlerResult {
    if input.is_empty() {
        return Ok(ToolResult::failure("Input code is required"));
    }

    let language = options.str_or("language", "javascript");
    let tab_width = options.count_in("tabWidth", 2, 1, 8);
    let print_width = options.count_in("printWidth", 80, 40, 200);

    let output = match language {
        "css" => style::beautify(input, tab_width),
        "html" => markup::format_markup(input, tab_width, true),
        _ => script::beautify(input, tab_width, print_width),
    };

    Ok(ToolResult::success(output)
        .with_metadata("language", language)
        .with_metadata("tabWidth", tab_width))
}

/// `format:data`
///
/// YAML is emitted with the serializer's fixed two-space layout; `tabWidth`
/// applies to JSON and XML.
pub fn data(input: &str, options: &ToolOptions) -> HandlerResult {
    if input.is_empty() {
        return Ok(ToolResult::failure("Input is required"));
    }

    let format = options.str_or("language", "json");
    let indent = options.count_in("tabWidth", 2, 1, 8);

    let output = match format {
        "json" => to_pretty_json(&serde_json::from_str::<Value>(input)?, indent)?,
        "yaml" => serde_yaml::to_string(&serde_yaml::from_str::<Value>(input)?)?,
        "xml" => markup::format_markup(input, indent, false),
        other => return Err(ToolError::unsupported("format", other)),
    };

    Ok(ToolResult::success(output)
        .with_metadata("format", format)
        .with_metadata("tabWidth", indent))
}
