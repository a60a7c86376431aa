//! JSONPath query and JSON Schema validation

use jsonschema::JSONSchema;
use serde_json::Value;
use serde_json_path::JsonPath;

use crate::types::{ToolOptions, ToolResult};
use super::error::{HandlerResult, ToolError};
use super::support::{scalar_text, to_pretty_json};

/// Keywords removed from the schema root before compiling
const ANNOTATION_KEYWORDS: &[&str] = &[
    "$schema",
    "$id",
    "id",
    "title",
    "description",
    "default",
    "examples",
    "dependentRequired",
];

fn parse_input(input: &str) -> Result<Value, ToolError> {
    if input.is_empty() {
        return Err(ToolError::invalid("JSON input is required"));
    }
    Ok(serde_json::from_str(input)?)
}

/// `json:jsonpath`
pub fn jsonpath(input: &str, options: &ToolOptions) -> HandlerResult {
    let json = parse_input(input)?;
    let path = options.str_or("path", "$");

    let query = JsonPath::parse(path)
        .map_err(|e| ToolError::invalid(format!("Invalid JSONPath expression: {}", e)))?;
    let matches = query.query(&json).all();

    let output = match matches.as_slice() {
        [] => String::new(),
        [single @ (Value::String(_) | Value::Number(_) | Value::Bool(_))] => scalar_text(single),
        [single @ (Value::Object(_) | Value::Array(_))] => to_pretty_json(single, 2)?,
        many => to_pretty_json(many, 2)?,
    };

    Ok(ToolResult::success(output)
        .with_metadata("matches", matches.len())
        .with_metadata("path", path))
}

/// `json:schema`
pub fn schema(input: &str, options: &ToolOptions) -> HandlerResult {
    let json = parse_input(input)?;

    let Some(schema_text) = options.str("schema") else {
        return Ok(ToolResult::success(to_pretty_json(&json, 2)?)
            .with_metadata("message", "Provide a schema to validate the JSON"));
    };

    let mut schema: Value = serde_json::from_str(schema_text)
        .map_err(|e| ToolError::invalid(format!("Invalid schema: {}", e)))?;
    if let Value::Object(root) = &mut schema {
        for keyword in ANNOTATION_KEYWORDS {
            root.remove(*keyword);
        }
    }

    let compiled = match JSONSchema::options().compile(&schema) {
        Ok(compiled) => compiled,
        Err(e) => {
            let message = e.to_string();
            return Ok(ToolResult::failure(format!("Invalid schema: {}", message))
                .with_metadata("schemaError", message));
        }
    };

    let errors: Vec<String> = match compiled.validate(&json) {
        Ok(()) => Vec::new(),
        Err(errors) => errors
            .map(|e| format!("{}: {}", e.instance_path, e))
            .collect(),
    };

    if errors.is_empty() {
        return Ok(ToolResult::success("Valid JSON")
            .with_metadata("errors", 0)
            .with_metadata("message", "Valid JSON")
            .with_metadata("valid", true));
    }

    Ok(ToolResult::failure(format!("Invalid JSON\n{}", errors.join("\n")))
        .with_metadata("errors", errors.len())
        .with_metadata("valid", false))
}
