//! Built-in tool catalog
//!
//! Registration order is the order the sidebar lists the tools in.

use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::logging::SharedLogger;
use crate::types::{ToolMetadata, ToolOption, ToolOptions, ToolResult};
use super::error::HandlerResult;
use super::registry::ToolRegistry;
use super::{
    certificate, color, datetime, encoding, format, generators, hash, json, regex_tester, text,
    units,
};

const MODES: &[(&str, &str)] = &[("Encode", "encode"), ("Decode", "decode")];

const DATA_FORMATS: &[(&str, &str)] = &[
    ("JSON", "json"),
    ("YAML", "yaml"),
    ("CSV", "csv"),
    ("JSONL", "jsonl"),
    ("XML", "xml"),
];

const BYTE_UNITS: &[(&str, &str)] = &[
    ("Bytes", "B"),
    ("KB", "KB"),
    ("MB", "MB"),
    ("GB", "GB"),
    ("TB", "TB"),
    ("PB", "PB"),
    ("EB", "EB"),
];

fn count() -> ToolOption {
    ToolOption::number("count", "Count", 1).range(1.0, 100.0)
}

fn tab_width() -> ToolOption {
    ToolOption::number("tabWidth", "Tab Width", 2).range(1.0, 8.0)
}

fn register_encoding(registry: &ToolRegistry) {
    registry.register(
        ToolMetadata::new("base64")
            .named("Base64")
            .in_category("Encoding")
            .with_placeholder("Enter text...")
            .with_options(vec![
                ToolOption::select("mode", "Mode", "encode", MODES),
                ToolOption::select(
                    "type",
                    "Encoding Type",
                    "standard",
                    &[("Standard", "standard"), ("URL-Safe", "url"), ("MIME", "mime")],
                ),
            ]),
        encoding::base64,
    );
    registry.register(
        ToolMetadata::new("base32")
            .named("Base32")
            .in_category("Encoding")
            .with_placeholder("Enter text...")
            .with_options(vec![ToolOption::select("mode", "Mode", "encode", MODES)]),
        encoding::base32,
    );
    registry.register(
        ToolMetadata::new("url")
            .named("URL")
            .in_category("Encoding")
            .with_placeholder("Enter text...")
            .with_options(vec![ToolOption::select("mode", "Mode", "encode", MODES)]),
        encoding::url,
    );
    registry.register(
        ToolMetadata::new("jwt")
            .named("JWT")
            .in_category("Encoding")
            .with_placeholder("Enter text...")
            .with_options(vec![
                ToolOption::select("mode", "Mode", "decode", MODES),
                ToolOption::text("secret", "Secret Key", "secret"),
                ToolOption::text("header", "Custom Header (JSON)", ""),
            ]),
        encoding::jwt,
    );
}

fn register_text(registry: &ToolRegistry) {
    registry.register(
        ToolMetadata::new("text:case")
            .named("Case Transform")
            .in_category("Text")
            .with_placeholder("Enter text to transform...")
            .with_options(vec![ToolOption::select(
                "type",
                "Case Type",
                "upper",
                &[
                    ("UPPERCASE", "upper"),
                    ("lowercase", "lower"),
                    ("Title Case", "title"),
                    ("Sentence case", "sentence"),
                    ("camelCase", "camel"),
                    ("snake_case", "snake"),
                    ("kebab-case", "kebab"),
                    ("esreveR", "reverse"),
                ],
            )]),
        text::case,
    );
    registry.register(
        ToolMetadata::new("text:sort")
            .named("Text Sort")
            .in_category("Text")
            .with_placeholder("Enter text to sort (one per line)...")
            .with_options(vec![
                ToolOption::select(
                    "order",
                    "Sort Order",
                    "asc",
                    &[("Ascending", "asc"), ("Descending", "desc")],
                ),
                ToolOption::select(
                    "mode",
                    "Sort Mode",
                    "line",
                    &[
                        ("Alphabetical", "line"),
                        ("Numeric", "numeric"),
                        ("By Length", "length"),
                        ("Random Shuffle", "shuffle"),
                    ],
                ),
            ]),
        text::sort,
    );
    registry.register(
        ToolMetadata::new("text:filter")
            .named("Text Filter")
            .in_category("Text")
            .with_placeholder("Enter text to filter (one per line)...")
            .with_options(vec![
                ToolOption::checkbox("removeEmpty", "Remove Empty Lines", true),
                ToolOption::checkbox("unique", "Remove Duplicates", false),
                ToolOption::text("pattern", "Regex Pattern", ""),
                ToolOption::checkbox("caseSensitive", "Case Sensitive", false),
                ToolOption::number("minLength", "Min Length", 0),
                ToolOption::number("maxLength", "Max Length", 0),
            ]),
        text::filter,
    );
    registry.register(
        ToolMetadata::new("text:escape")
            .named("Text Escape")
            .in_category("Text")
            .with_placeholder("Enter text to escape...")
            .with_options(vec![ToolOption::select(
                "type",
                "Escape Type",
                "html",
                &[
                    ("HTML", "html"),
                    ("XML", "xml"),
                    ("JSON String", "json"),
                    ("CSV", "csv"),
                    ("Java String", "java"),
                ],
            )]),
        text::escape,
    );
    registry.register(
        ToolMetadata::new("text:format")
            .named("Format Converter")
            .in_category("Format")
            .with_placeholder("Enter text to convert...")
            .with_options(vec![
                ToolOption::select("from", "From Format", "json", DATA_FORMATS),
                ToolOption::select("to", "To Format", "yaml", DATA_FORMATS),
            ]),
        text::convert,
    );
}

fn register_generators(registry: &ToolRegistry) {
    registry.register(
        ToolMetadata::new("uuid:generate")
            .named("UUID Generator")
            .in_category("Generators")
            .without_input()
            .with_placeholder("Click Execute to generate UUID")
            .with_options(vec![
                ToolOption::select("version", "Version", "4", &[("UUID v1", "1"), ("UUID v4", "4")]),
                count(),
            ]),
        generators::uuid,
    );
    registry.register(
        ToolMetadata::new("ulid:generate")
            .named("ULID Generator")
            .in_category("Generators")
            .without_input()
            .with_placeholder("Click Execute to generate ULID")
            .with_options(vec![count()]),
        generators::ulid,
    );
    registry.register(
        ToolMetadata::new("nanoid:generate")
            .named("NanoID Generator")
            .in_category("Generators")
            .without_input()
            .with_placeholder("Click Execute to generate NanoID")
            .with_options(vec![
                ToolOption::number("length", "Length", 21).range(1.0, 100.0),
                count(),
                ToolOption::text("alphabet", "Custom Alphabet", ""),
            ]),
        generators::nanoid,
    );
    registry.register(
        ToolMetadata::new("password:generate")
            .named("Password Generator")
            .in_category("Generators")
            .without_input()
            .with_placeholder("Click Execute to generate password")
            .with_options(vec![
                ToolOption::number("length", "Length", 16).range(4.0, 128.0),
                count(),
                ToolOption::checkbox("uppercase", "Include Uppercase", true),
                ToolOption::checkbox("lowercase", "Include Lowercase", true),
                ToolOption::checkbox("numbers", "Include Numbers", true),
                ToolOption::checkbox("symbols", "Include Symbols", true),
                ToolOption::checkbox("excludeSimilar", "Exclude Similar (i, l, 1, L, o, 0, O)", true),
                ToolOption::text("exclude", "Exclude Characters", ""),
            ]),
        generators::password,
    );
    registry.register(
        ToolMetadata::new("lorem:generate")
            .named("Lorem Ipsum")
            .in_category("Generators")
            .without_input()
            .with_placeholder("Click Execute to generate text")
            .with_options(vec![
                ToolOption::select(
                    "type",
                    "Output Type",
                    "words",
                    &[("Words", "words"), ("Sentences", "sentences"), ("Paragraphs", "paragraphs")],
                ),
                count(),
            ]),
        generators::lorem,
    );
    registry.register(
        ToolMetadata::new("qrcode:generate")
            .named("QR Code Generator")
            .in_category("Generators")
            .with_placeholder("Enter text or URL...")
            .with_options(vec![
                ToolOption::number("size", "Size (px)", 300).range(50.0, 1000.0),
                ToolOption::number("margin", "Margin", 2).range(0.0, 10.0),
                ToolOption::select(
                    "errorCorrection",
                    "Error Correction",
                    "M",
                    &[
                        ("Low (7%)", "L"),
                        ("Medium (15%)", "M"),
                        ("Quartile (25%)", "Q"),
                        ("High (30%)", "H"),
                    ],
                ),
                ToolOption::text("colorDark", "Dark Color", "#000000"),
                ToolOption::text("colorLight", "Light Color", "#ffffff"),
            ]),
        generators::qrcode,
    );
    registry.register(
        ToolMetadata::new("barcode:generate")
            .named("Barcode Generator")
            .in_category("Generators")
            .with_placeholder("Enter barcode text...")
            .with_options(vec![
                ToolOption::select(
                    "format",
                    "Barcode Type",
                    "code128",
                    &[
                        ("Code 128", "code128"),
                        ("Code 39", "code39"),
                        ("EAN-13", "ean13"),
                        ("UPC-A", "upca"),
                        ("QR Code", "qrcode"),
                    ],
                ),
                ToolOption::number("scale", "Scale", 3).range(1.0, 5.0),
                ToolOption::number("height", "Height", 10).range(5.0, 50.0),
                ToolOption::checkbox("includeText", "Include Text", true),
            ]),
        generators::barcode,
    );
}

fn register_data(registry: &ToolRegistry) {
    registry.register(
        ToolMetadata::new("json:jsonpath")
            .named("JSON Path")
            .in_category("JSON")
            .with_placeholder("Enter JSON to query...")
            .with_options(vec![ToolOption::text("path", "JSONPath Expression", "$")]),
        json::jsonpath,
    );
    registry.register(
        ToolMetadata::new("json:schema")
            .named("JSON Schema Validator")
            .in_category("JSON")
            .with_placeholder("Enter JSON to validate...")
            .with_options(vec![ToolOption::textarea("schema", "JSON Schema", 10)
                .with_placeholder("Enter JSON Schema to validate against...")]),
        json::schema,
    );
    registry.register(
        ToolMetadata::new("hash:generator")
            .named("Hash Generator")
            .in_category("Hash")
            .with_placeholder("Enter text to hash...")
            .with_options(vec![
                ToolOption::select(
                    "algorithm",
                    "Algorithm",
                    "sha256",
                    &[("MD5", "md5"), ("SHA-1", "sha1"), ("SHA-256", "sha256"), ("SHA-512", "sha512")],
                ),
                ToolOption::select(
                    "outputFormat",
                    "Output Format",
                    "hex",
                    &[("Hexadecimal", "hex"), ("Base64", "base64")],
                ),
                ToolOption::select("case", "Case", "lower", &[("Lowercase", "lower"), ("Uppercase", "upper")]),
                ToolOption::text("secret", "HMAC Secret (optional)", ""),
            ]),
        hash::generate,
    );
}

fn register_converters(registry: &ToolRegistry) {
    let formats: Vec<(&str, &str)> = [
        "Unix (ms)",
        "Unix (sec)",
        "ISO 8601",
        "RFC 1123",
        "RFC 2822",
        "YYYY-MM-DD",
        "DD/MM/YYYY",
        "MM/DD/YYYY",
    ]
    .iter()
    .map(|name| (*name, *name))
    .collect();

    registry.register(
        ToolMetadata::new("datetime:converter")
            .named("Timestamp Converter")
            .in_category("DateTime")
            .with_placeholder("Enter timestamp or date (leave empty for current time)...")
            .with_options(vec![ToolOption::select("format", "Display Format", "ISO 8601", &formats)]),
        datetime::convert,
    );
    registry.register(
        ToolMetadata::new("units:convert")
            .named("Unit Converter")
            .in_category("Units")
            .with_placeholder("Enter value to convert...")
            .with_options(vec![
                ToolOption::select(
                    "category",
                    "Category",
                    "bytes",
                    &[
                        ("Data", "bytes"),
                        ("Time", "time"),
                        ("Transfer Rate", "transfer"),
                        ("Temperature", "temperature"),
                        ("Length", "length"),
                        ("Weight", "weight"),
                    ],
                ),
                ToolOption::select("from", "From", "B", BYTE_UNITS),
                ToolOption::select("to", "To", "MB", BYTE_UNITS),
            ]),
        units::convert,
    );
}

fn register_formatters(registry: &ToolRegistry) {
    registry.register(
        ToolMetadata::new("format:code")
            .named("Code Formatter")
            .in_category("Format")
            .with_placeholder("Paste code to format...")
            .with_options(vec![
                ToolOption::select(
                    "language",
                    "Language",
                    "javascript",
                    &[("JavaScript", "javascript"), ("TypeScript", "typescript")],
                ),
                tab_width(),
                ToolOption::number("printWidth", "Line Width", 80).range(40.0, 200.0),
            ]),
        format::code,
    );
    registry.register(
        ToolMetadata::new("format:sql")
            .named("SQL Formatter")
            .in_category("Format")
            .with_placeholder("Paste SQL to format...")
            .with_options(vec![
                ToolOption::select(
                    "language",
                    "SQL Dialect",
                    "sql",
                    &[
                        ("Standard SQL", "sql"),
                        ("MySQL", "mysql"),
                        ("PostgreSQL", "postgresql"),
                        ("SQLite", "sqlite"),
                    ],
                ),
                ToolOption::select(
                    "indentStyle",
                    "Indent Style",
                    "standard",
                    &[
                        ("Standard", "standard"),
                        ("Tabular Left", "tabularLeft"),
                        ("Tabular Right", "tabularRight"),
                    ],
                ),
                ToolOption::number("linesBetweenQueries", "Lines Between Queries", 2).range(1.0, 5.0),
                tab_width(),
            ]),
        format::sql,
    );
    registry.register(
        ToolMetadata::new("format:data")
            .named("Data Formatter")
            .in_category("Format")
            .with_placeholder("Paste JSON, YAML, or XML to format...")
            .with_options(vec![
                ToolOption::select("language", "Format", "json", &[("JSON", "json"), ("YAML", "yaml"), ("XML", "xml")]),
                tab_width(),
            ]),
        format::data,
    );
}

fn register_advanced(registry: &ToolRegistry) {
    registry.register(
        ToolMetadata::new("regex:test")
            .named("Regex Tester")
            .in_category("Advanced")
            .without_input()
            .with_options(vec![
                ToolOption::text("pattern", "Regex Pattern", "")
                    .with_placeholder("Enter regex pattern (e.g., ^[a-z]+$)"),
                ToolOption::textarea("text", "Test Text", 6)
                    .with_placeholder("Enter text to test against pattern..."),
                ToolOption::select(
                    "flags",
                    "Flags",
                    "g",
                    &[
                        ("Global (g)", "g"),
                        ("Case Insensitive (i)", "i"),
                        ("Multiline (m)", "m"),
                        ("Global + Case Insensitive (gi)", "gi"),
                        ("Global + Multiline (gm)", "gm"),
                    ],
                ),
            ]),
        regex_tester::evaluate,
    );
    registry.register(
        ToolMetadata::new("color:picker")
            .named("Color Picker")
            .in_category("Advanced")
            .without_input()
            .with_options(vec![ToolOption::color("color", "Select Color", "#3498db")]),
        color::picker,
    );
    registry.register(
        ToolMetadata::new("certificate:analyze")
            .named("Certificate Analyzer")
            .in_category("Advanced")
            .with_placeholder("Enter PEM or DER certificate..."),
        certificate::analyze,
    );
}

/// Register every built-in tool on `registry`
pub fn register_builtin(registry: &ToolRegistry) {
    register_encoding(registry);
    register_text(registry);
    register_generators(registry);
    register_data(registry);
    register_converters(registry);
    register_formatters(registry);
    register_advanced(registry);
}

/// A registry holding the built-in tools
pub fn builtin_registry(logger: SharedLogger) -> ToolRegistry {
    let registry = ToolRegistry::new(logger);
    register_builtin(&registry);
    registry
}

impl ToolRegistry {
    /// A registry holding the built-in tools, without logging
    pub fn builtin() -> Self {
        let registry = ToolRegistry::default();
        register_builtin(&registry);
        registry
    }

    /// The process-wide registry
    pub fn global() -> Arc<ToolRegistry> {
        global_registry()
    }
}

// Global registry instance
static GLOBAL_REGISTRY: Lazy<Arc<ToolRegistry>> = Lazy::new(|| Arc::new(ToolRegistry::builtin()));

/// The process-wide registry, seeded with the built-in tools
pub fn global_registry() -> Arc<ToolRegistry> {
    GLOBAL_REGISTRY.clone()
}

/// Register a tool globally, replacing any tool with the same id
pub fn register_tool<F>(metadata: ToolMetadata, handler: F)
where
    F: Fn(&str, &ToolOptions) -> HandlerResult + Send + Sync + 'static,
{
    GLOBAL_REGISTRY.register(metadata, handler);
}

/// Run a tool from the global registry
pub fn execute_tool(id: &str, input: &str, options: &ToolOptions) -> ToolResult {
    GLOBAL_REGISTRY.execute(id, input, options)
}

/// Metadata of every globally registered tool
pub fn list_tools() -> Vec<ToolMetadata> {
    GLOBAL_REGISTRY.metadata()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;

    fn registry() -> ToolRegistry {
        builtin_registry(Arc::new(NoOpLogger))
    }

    #[test]
    fn test_catalog_order() {
        assert_eq!(
            registry().ids(),
            vec![
                "base64", "base32", "url", "jwt",
                "text:case", "text:sort", "text:filter", "text:escape", "text:format",
                "uuid:generate", "ulid:generate", "nanoid:generate", "password:generate",
                "lorem:generate", "qrcode:generate", "barcode:generate",
                "json:jsonpath", "json:schema", "hash:generator",
                "datetime:converter", "units:convert",
                "format:code", "format:sql", "format:data",
                "regex:test", "color:picker", "certificate:analyze",
            ]
        );
    }

    #[test]
    fn test_metadata_shape() {
        let registry = registry();
        let uuid = registry.get_metadata("uuid:generate").unwrap();
        assert_eq!(uuid.category, "Generators");
        assert!(!uuid.has_input);
        assert_eq!(uuid.option("count").unwrap().max, Some(100.0));

        let cert = registry.get_metadata("certificate:analyze").unwrap();
        assert_eq!(cert.name, "Certificate Analyzer");
        assert!(cert.has_input);
        assert!(cert.options.is_none());

        let schema = registry.get_metadata("json:schema").unwrap();
        assert_eq!(schema.option("schema").unwrap().rows, Some(10));
    }

    #[test]
    fn test_every_tool_runs() {
        let registry = registry();
        for id in registry.ids() {
            // Any outcome is fine as long as the registry answers
            let result = registry.execute(&id, "hello", &ToolOptions::new());
            assert!(result.success || result.error.is_some(), "{}", id);
        }
    }

    #[test]
    fn test_dispatch_through_registry() {
        let registry = registry();
        let result = registry.execute("base64", "Hello", &ToolOptions::new());
        assert_eq!(result.output_str(), "SGVsbG8=");

        let result = registry.execute(
            "hash:generator",
            "Hello World",
            &ToolOptions::new().with("algorithm", "md5"),
        );
        assert_eq!(result.output_str(), "b10a8db164e0754105b7a99be72e3fe5");
    }

    #[test]
    fn test_global_registry() {
        assert!(global_registry().contains("base64"));
        assert_eq!(execute_tool("url", "a b", &ToolOptions::new()).output_str(), "a%20b");
        assert!(list_tools().len() >= 27);
    }
}
