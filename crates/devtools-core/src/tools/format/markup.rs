//! HTML and XML pretty-printer
//!
//! Elements holding only text stay on one line; everything else gets one
//! node per line. In HTML mode embedded scripts and styles are formatted
//! with the script and style beautifiers.

use super::printer::Printer;
use super::{script, style};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Elements whose content is not markup
const RAW_ELEMENTS: &[&str] = &["script", "style", "pre", "textarea"];

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Open { name: String, tag: String },
    Close { name: String, tag: String },
    /// Self-closing and void elements
    Single(String),
    Text(String),
    /// Comments, doctypes, processing instructions and CDATA
    Special(String),
    /// Unparsed content of a raw element
    Raw(String),
}

fn find_from(chars: &[char], start: usize, needle: &str) -> Option<usize> {
    let needle: Vec<char> = needle.chars().collect();
    (start..chars.len()).find(|&i| chars[i..].starts_with(&needle))
}

/// Index just past the `>` closing a tag, honouring quoted attribute values
fn tag_end(chars: &[char], start: usize) -> usize {
    let mut quote: Option<char> = None;
    for (i, c) in chars.iter().enumerate().skip(start) {
        match (quote, *c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(*c),
            (None, '>') => return i + 1,
            _ => {}
        }
    }
    chars.len()
}

fn tag_name(tag: &str) -> String {
    tag.trim_start_matches(&['<', '/'][..])
        .chars()
        .take_while(|c| !c.is_whitespace() && *c != '>' && *c != '/')
        .collect()
}

/// Collapse whitespace inside a tag outside attribute values
fn normalize_tag(tag: &str) -> String {
    let mut out = String::with_capacity(tag.len());
    let mut quote: Option<char> = None;
    for c in tag.chars() {
        match quote {
            Some(q) => {
                out.push(c);
                if c == q {
                    quote = None;
                }
            }
            None if c.is_whitespace() => {
                if !out.ends_with(' ') {
                    out.push(' ');
                }
            }
            None => {
                if matches!(c, '"' | '\'') {
                    quote = Some(c);
                }
                if c == '>' && out.ends_with(' ') && !out.ends_with("/ ") {
                    out.pop();
                }
                out.push(c);
            }
        }
    }
    out
}

fn push_text(nodes: &mut Vec<Node>, text: String) {
    match nodes.last_mut() {
        Some(Node::Text(previous)) => previous.push_str(&text),
        _ => nodes.push(Node::Text(text)),
    }
}

fn parse(source: &str, html: bool) -> Vec<Node> {
    let chars: Vec<char> = source.chars().collect();
    let mut nodes = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        if chars[i] != '<' {
            let end = find_from(&chars, i, "<").unwrap_or(chars.len());
            push_text(&mut nodes, chars[i..end].iter().collect());
            i = end;
            continue;
        }

        let rest = &chars[i..];
        let special_end = if rest.starts_with(&['<', '!', '-', '-']) {
            Some(find_from(&chars, i + 4, "-->").map_or(chars.len(), |e| e + 3))
        } else if rest.starts_with(&"<![CDATA[".chars().collect::<Vec<_>>()) {
            Some(find_from(&chars, i, "]]>").map_or(chars.len(), |e| e + 3))
        } else if rest.starts_with(&['<', '!']) || rest.starts_with(&['<', '?']) {
            Some(tag_end(&chars, i))
        } else {
            None
        };
        if let Some(end) = special_end {
            nodes.push(Node::Special(chars[i..end].iter().collect()));
            i = end;
            continue;
        }

        let next = chars.get(i + 1).copied();
        if !next.is_some_and(|c| c == '/' || c.is_alphabetic() || c == '_' || c == ':') {
            let end = find_from(&chars, i + 1, "<").unwrap_or(chars.len());
            push_text(&mut nodes, chars[i..end].iter().collect());
            i = end;
            continue;
        }

        let end = tag_end(&chars, i);
        let tag = normalize_tag(&chars[i..end].iter().collect::<String>());
        let name = tag_name(&tag);
        let lower = name.to_lowercase();
        i = end;

        if next == Some('/') {
            nodes.push(Node::Close { name, tag });
        } else if tag.ends_with("/>") || (html && VOID_ELEMENTS.contains(&lower.as_str())) {
            nodes.push(Node::Single(tag));
        } else if html && RAW_ELEMENTS.contains(&lower.as_str()) {
            let close = format!("</{}", lower);
            let content_end = (i..chars.len())
                .find(|&j| {
                    chars[j] == '<'
                        && chars[j..]
                            .iter()
                            .take(close.chars().count())
                            .collect::<String>()
                            .to_lowercase()
                            == close
                })
                .unwrap_or(chars.len());
            nodes.push(Node::Open { name, tag });
            nodes.push(Node::Raw(chars[i..content_end].iter().collect()));
            i = content_end;
        } else {
            nodes.push(Node::Open { name, tag });
        }
    }

    nodes
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn same_name(a: &str, b: &str, html: bool) -> bool {
    if html {
        a.eq_ignore_ascii_case(b)
    } else {
        a == b
    }
}

fn write_raw(printer: &mut Printer, name: &str, content: &str, level: usize, indent: usize) {
    let formatted = match name.to_lowercase().as_str() {
        "script" => script::beautify(content, indent, 0),
        "style" => style::beautify(content, indent),
        _ => {
            // pre and textarea keep their content byte for byte
            printer.write(content, false);
            return;
        }
    };
    if formatted.trim().is_empty() {
        return;
    }
    for line in formatted.lines() {
        if line.is_empty() {
            printer.blank_line();
        }
        printer.newline(level + 1);
        printer.write(line, false);
    }
    printer.newline(level);
}

/// Reformat markup with the given indent width
pub fn format_markup(source: &str, indent: usize, html: bool) -> String {
    let nodes = parse(source, html);
    let mut printer = Printer::spaces(indent);
    let mut level = 0usize;
    let mut i = 0;

    while i < nodes.len() {
        match &nodes[i] {
            Node::Open { name, tag } => {
                printer.newline(level);
                printer.write(tag, false);

                if let Some(Node::Raw(content)) = nodes.get(i + 1) {
                    write_raw(&mut printer, name, content, level, indent);
                    if let Some(Node::Close { tag: close, .. }) = nodes.get(i + 2) {
                        printer.write(close, false);
                        i += 1;
                    }
                    i += 2;
                    continue;
                }

                let closes = |node: Option<&Node>| {
                    matches!(node, Some(Node::Close { name: close, .. }) if same_name(close, name, html))
                };
                if let (Some(Node::Text(text)), true) = (nodes.get(i + 1), closes(nodes.get(i + 2))) {
                    if let Some(Node::Close { tag: close, .. }) = nodes.get(i + 2) {
                        printer.write(&collapse(text), false);
                        printer.write(close, false);
                    }
                    i += 3;
                    continue;
                }
                if closes(nodes.get(i + 1)) {
                    if let Some(Node::Close { tag: close, .. }) = nodes.get(i + 1) {
                        printer.write(close, false);
                    }
                    i += 2;
                    continue;
                }
                level += 1;
            }
            Node::Close { tag, .. } => {
                level = level.saturating_sub(1);
                printer.newline(level);
                printer.write(tag, false);
            }
            Node::Single(tag) | Node::Special(tag) => {
                printer.newline(level);
                printer.write(tag, false);
            }
            Node::Text(text) => {
                let text = collapse(text);
                if !text.is_empty() {
                    printer.newline(level);
                    printer.write(&text, false);
                }
            }
            Node::Raw(content) => {
                printer.newline(level);
                printer.write(content, false);
            }
        }
        i += 1;
    }

    printer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_elements() {
        assert_eq!(
            format_markup("<div><p>Hello</p></div>", 2, true),
            "<div>\n  <p>Hello</p>\n</div>"
        );
        assert_eq!(
            format_markup("<root><child><name>test</name></child><empty></empty></root>", 2, false),
            "<root>\n  <child>\n    <name>test</name>\n  </child>\n  <empty></empty>\n</root>"
        );
    }

    #[test]
    fn test_void_and_special_nodes() {
        assert_eq!(
            format_markup("<!DOCTYPE html><body><br><img  src=\"a b.png\" ><!-- note --></body>", 4, true),
            "<!DOCTYPE html>\n<body>\n    <br>\n    <img src=\"a b.png\">\n    <!-- note -->\n</body>"
        );
        assert_eq!(
            format_markup("<?xml version=\"1.0\"?><a><b/>text  here</a>", 2, false),
            "<?xml version=\"1.0\"?>\n<a>\n  <b/>\n  text here\n</a>"
        );
    }

    #[test]
    fn test_embedded_script_and_style() {
        assert_eq!(
            format_markup("<head><style>p{color:red}</style><script>let a=1;</script></head>", 2, true),
            "<head>\n  <style>\n    p {\n      color: red\n    }\n  </style>\n  <script>\n    let a = 1;\n  </script>\n</head>"
        );
    }

    #[test]
    fn test_text_input_passes_through() {
        assert_eq!(format_markup("{\"name\": \"test\"}", 2, false), "{\"name\": \"test\"}");
        assert_eq!(format_markup("a < b", 2, false), "a < b");
        assert_eq!(
            format_markup("<script src=\"x.js\"></script>", 2, true),
            "<script src=\"x.js\"></script>"
        );
    }
}
