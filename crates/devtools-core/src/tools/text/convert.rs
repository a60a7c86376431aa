//! `text:format`: conversion between JSON, YAML, CSV, JSON Lines and XML
//!
//! Every input format is first read into a [`serde_json::Value`], which is
//! then written out in the target format.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};

use crate::types::{ToolOptions, ToolResult};
use crate::tools::error::{HandlerResult, ToolError};
use crate::tools::support::{scalar_text, to_pretty_json};

/// `text:format`
pub fn convert(input: &str, options: &ToolOptions) -> HandlerResult {
    let from = options.str_or("from", "json");
    let to = options.str_or("to", "yaml");

    let parsed = match from {
        "json" => serde_json::from_str(input)?,
        "yaml" => serde_yaml::from_str(input)?,
        "csv" => csv_to_value(input)?,
        "jsonl" => jsonl_to_value(input)?,
        "xml" => xml_to_value(input)?,
        _ => Value::String(input.to_string()),
    };

    let output = match to {
        "json" => to_pretty_json(&parsed, 2)?,
        "yaml" => serde_yaml::to_string(&parsed)?,
        "csv" => value_to_csv(&parsed)?,
        "jsonl" => value_to_jsonl(&parsed)?,
        "xml" => value_to_xml(&parsed, "root"),
        _ => plain_text(&parsed),
    };

    Ok(ToolResult::success(output)
        .with_metadata("from", from)
        .with_metadata("to", to))
}

fn plain_text(value: &Value) -> String {
    match value {
        Value::Array(_) | Value::Object(_) => value.to_string(),
        scalar => scalar_text(scalar),
    }
}

/// Header row plus data rows into an array of string-valued objects
fn csv_to_value(input: &str) -> Result<Value, ToolError> {
    let text = input.trim();
    if !text.contains('\n') {
        return Err(ToolError::invalid(
            "CSV must have at least a header and one data row",
        ));
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Map<String, Value> = headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                let cell = record.get(i).unwrap_or_default();
                (header.clone(), Value::from(cell))
            })
            .collect();
        rows.push(Value::Object(row));
    }

    if rows.is_empty() {
        return Err(ToolError::invalid(
            "CSV must have at least a header and one data row",
        ));
    }
    Ok(Value::Array(rows))
}

fn jsonl_to_value(input: &str) -> Result<Value, ToolError> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| serde_json::from_str(line).map_err(ToolError::from))
        .collect::<Result<Vec<Value>, _>>()
        .map(Value::Array)
}

/// Rows of an array of objects; a lone object is one row
fn value_to_csv(value: &Value) -> Result<String, ToolError> {
    let rows: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };
    let Some(first) = rows.first() else {
        return Ok(String::new());
    };
    let Value::Object(first) = first else {
        return Err(ToolError::invalid(
            "Cannot convert to CSV: data must be an array of objects",
        ));
    };
    let headers: Vec<&String> = first.keys().collect();

    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(&headers)?;
    for row in &rows {
        let Value::Object(row) = row else {
            return Err(ToolError::invalid(
                "Cannot convert to CSV: all array items must be objects",
            ));
        };
        let cells: Vec<String> = headers
            .iter()
            .map(|header| match row.get(header.as_str()) {
                None | Some(Value::Null) => String::new(),
                Some(cell) => plain_text(cell),
            })
            .collect();
        writer.write_record(&cells)?;
    }

    let bytes = writer.into_inner().map_err(|e| ToolError::other(e.error()))?;
    let text = String::from_utf8(bytes).map_err(ToolError::other)?;
    Ok(text.trim_end_matches('\n').to_string())
}

fn value_to_jsonl(value: &Value) -> Result<String, ToolError> {
    let items: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };
    let lines = items
        .into_iter()
        .map(serde_json::to_string)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(lines.join("\n"))
}

fn escape_xml_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Arrays repeat the element name; null and empty objects self-close
fn value_to_xml(value: &Value, key: &str) -> String {
    match value {
        Value::Null => format!("<{}/>", key),
        Value::Array(items) => items.iter().map(|item| value_to_xml(item, key)).collect(),
        Value::Object(fields) if fields.is_empty() => format!("<{}/>", key),
        Value::Object(fields) => {
            let children: String = fields.iter().map(|(k, v)| value_to_xml(v, k)).collect();
            format!("<{key}>{children}</{key}>")
        }
        scalar => format!("<{key}>{}</{key}>", escape_xml_text(&scalar_text(scalar))),
    }
}

/// Element text as a typed scalar: booleans, integers and decimals
fn typed_text(text: &str) -> Value {
    let trimmed = text.trim();
    match trimmed {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }

    let digits = trimmed.strip_prefix('-').unwrap_or(trimmed);
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (digits, None),
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    if all_digits(int_part) && frac_part.map_or(true, all_digits) {
        if frac_part.is_none() {
            if let Ok(n) = trimmed.parse::<i64>() {
                return Value::from(n);
            }
        }
        if let Some(n) = trimmed.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
            return Value::Number(n);
        }
    }
    Value::String(trimmed.to_string())
}

/// An element being read; children with the same name collapse into an array
struct Element {
    name: String,
    fields: Map<String, Value>,
    text: String,
}

impl Element {
    fn open(start: &BytesStart<'_>) -> Result<Self, ToolError> {
        let mut fields = Map::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = format!("@{}", String::from_utf8_lossy(attr.key.as_ref()));
            fields.insert(key, Value::from(attr.unescape_value()?.into_owned()));
        }
        Ok(Self {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            fields,
            text: String::new(),
        })
    }

    fn add_child(&mut self, name: String, value: Value) {
        match self.fields.get_mut(&name) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                self.fields.insert(name, value);
            }
        }
    }

    fn close(mut self) -> (String, Value) {
        let value = if self.fields.is_empty() {
            typed_text(&self.text)
        } else {
            if !self.text.trim().is_empty() {
                self.fields.insert("#text".to_string(), typed_text(&self.text));
            }
            Value::Object(self.fields)
        };
        (self.name, value)
    }
}

/// XML document into `{rootTag: value}`
fn xml_to_value(input: &str) -> Result<Value, ToolError> {
    let mut reader = Reader::from_str(input);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<(String, Value)> = None;

    let mut finish = |stack: &mut Vec<Element>, element: Element| -> Result<(), ToolError> {
        let (name, value) = element.close();
        match stack.last_mut() {
            Some(parent) => parent.add_child(name, value),
            None if root.is_some() => {
                return Err(ToolError::invalid("Invalid XML: multiple root elements"));
            }
            None => root = Some((name, value)),
        }
        Ok(())
    };

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(Element::open(&start)?),
            Event::Empty(start) => {
                let element = Element::open(&start)?;
                finish(&mut stack, element)?;
            }
            Event::End(_) => {
                if let Some(element) = stack.pop() {
                    finish(&mut stack, element)?;
                }
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(ToolError::invalid(format!(
            "Invalid XML: unclosed element <{}>",
            open.name
        )));
    }
    let (name, value) = root.ok_or_else(|| ToolError::invalid("Invalid XML: no root element"))?;

    let mut document = Map::new();
    document.insert(name, value);
    Ok(Value::Object(document))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(input: &str, from: &str, to: &str) -> ToolResult {
        let options = ToolOptions::new().with("from", from).with("to", to);
        match convert(input, &options) {
            Ok(result) => result,
            Err(e) => e.into(),
        }
    }

    fn parsed(result: &ToolResult) -> Value {
        serde_json::from_str(result.output_str()).unwrap()
    }

    #[test]
    fn test_json_to_yaml() {
        let result = run(r#"{"key":"value"}"#, "json", "yaml");
        assert!(result.success);
        assert!(result.output_str().contains("key: value"));
        assert_eq!(result.meta("from"), Some(&json!("json")));
        assert_eq!(result.meta("to"), Some(&json!("yaml")));

        let nested = run(r#"{"a":{"b":{"c":"deep"}}}"#, "json", "yaml");
        assert!(nested.output_str().contains("b:"));
    }

    #[test]
    fn test_yaml_to_json() {
        let result = run("outer:\n  inner:\n    value: test", "yaml", "json");
        assert_eq!(parsed(&result)["outer"]["inner"]["value"], json!("test"));
    }

    #[test]
    fn test_json_to_csv() {
        let result = run(r#"[{"name":"John","age":30},{"name":"Jane","age":25}]"#, "json", "csv");
        assert_eq!(result.output_str(), "name,age\nJohn,30\nJane,25");

        let single = run(r#"{"name":"John","age":30}"#, "json", "csv");
        assert!(single.output_str().contains("name,age"));

        let quoted = run(r#"[{"city":"New York, NY","note":null}]"#, "json", "csv");
        assert_eq!(quoted.output_str(), "city,note\n\"New York, NY\",");
    }

    #[test]
    fn test_json_to_csv_requires_objects() {
        let result = run("[1, 2]", "json", "csv");
        assert!(!result.success);
        assert_eq!(
            result.error.as_deref(),
            Some("Cannot convert to CSV: data must be an array of objects")
        );

        let mixed = run(r#"[{"a":1}, 2]"#, "json", "csv");
        assert_eq!(
            mixed.error.as_deref(),
            Some("Cannot convert to CSV: all array items must be objects")
        );
    }

    #[test]
    fn test_csv_to_json() {
        let result = run("name,age\nJohn,30\nJane,25", "csv", "json");
        let rows = parsed(&result);
        assert_eq!(rows[0]["name"], json!("John"));
        assert_eq!(rows[0]["age"], json!("30"));

        let special = run("name,city\n\"John, Jr\",\"New York, NY\"", "csv", "json");
        assert_eq!(parsed(&special)[0]["city"], json!("New York, NY"));

        let escaped = run("name,description\nJohn,\"Test \"\"quoted\"\" text\"", "csv", "json");
        assert_eq!(parsed(&escaped)[0]["description"], json!("Test \"quoted\" text"));

        let multiline = run("name,desc\nJohn,\"Line1\nLine2\"", "csv", "json");
        assert_eq!(parsed(&multiline)[0]["desc"], json!("Line1\nLine2"));

        let empty = run("name,age,city\nJohn,,New York", "csv", "json");
        assert_eq!(parsed(&empty)[0]["age"], json!(""));
    }

    #[test]
    fn test_csv_requires_data_row() {
        let result = run("name,age", "csv", "json");
        assert!(!result.success);
        assert_eq!(
            result.error.as_deref(),
            Some("CSV must have at least a header and one data row")
        );
    }

    #[test]
    fn test_jsonl() {
        let result = run("{\"name\":\"John\"}\n\n{\"name\":\"Jane\"}", "jsonl", "json");
        assert_eq!(parsed(&result), json!([{"name": "John"}, {"name": "Jane"}]));

        assert_eq!(run("", "jsonl", "json").output_str(), "[]");
        assert_eq!(
            run(r#"[{"a":1},{"b":2}]"#, "json", "jsonl").output_str(),
            "{\"a\":1}\n{\"b\":2}"
        );
    }

    #[test]
    fn test_json_to_xml() {
        assert_eq!(
            run(r#"{"key":"value"}"#, "json", "xml").output_str(),
            "<root><key>value</key></root>"
        );
        assert_eq!(
            run(r#"{"items":["a","b"]}"#, "json", "xml").output_str(),
            "<root><items>a</items><items>b</items></root>"
        );
        assert!(run(r#"{"empty":null}"#, "json", "xml").output_str().contains("<empty/>"));
        assert!(run(r#"{"t":"a < b & c"}"#, "json", "xml")
            .output_str()
            .contains("<t>a &lt; b &amp; c</t>"));
    }

    #[test]
    fn test_xml_to_json() {
        let result = run(
            "<root><name>test</name><value>123</value><ratio>1.5</ratio><on>true</on></root>",
            "xml",
            "json",
        );
        assert_eq!(
            parsed(&result),
            json!({"root": {"name": "test", "value": 123, "ratio": 1.5, "on": true}})
        );

        let nested = run("<root><items><item>1</item><item>2</item></items></root>", "xml", "json");
        assert_eq!(parsed(&nested), json!({"root": {"items": {"item": [1, 2]}}}));

        let empty = run("<root><item/><item/></root>", "xml", "json");
        assert_eq!(parsed(&empty), json!({"root": {"item": ["", ""]}}));

        let attrs = run(r#"<user id="7">Ann</user>"#, "xml", "json");
        assert_eq!(parsed(&attrs), json!({"user": {"@id": "7", "#text": "Ann"}}));
    }

    #[test]
    fn test_xml_errors() {
        assert!(!run("plain", "xml", "json").success);
        assert!(!run("<a><b></b>", "xml", "json").success);
        assert!(!run("<a></b>", "xml", "json").success);
    }

    #[test]
    fn test_typed_text() {
        assert_eq!(typed_text(" 42 "), json!(42));
        assert_eq!(typed_text("-3.25"), json!(-3.25));
        assert_eq!(typed_text("1e5"), json!("1e5"));
        assert_eq!(typed_text(""), json!(""));
    }

    #[test]
    fn test_unknown_formats_and_empty_json() {
        let result = run("plain text", "unknown", "yaml");
        assert!(result.success);
        assert_eq!(result.output_str().trim(), "plain text");

        assert_eq!(run(r#"{"a":1}"#, "json", "unknown").output_str(), r#"{"a":1}"#);
        assert!(!run("", "json", "yaml").success);
    }
}
