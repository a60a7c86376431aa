//! CSS beautifier: one declaration per line, blank line between rules

use super::printer::Printer;

/// Collapse whitespace runs outside quotes and put one space after commas
fn normalize_value(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut quote: Option<char> = None;
    let mut pending_space = false;

    for c in text.trim().chars() {
        if let Some(q) = quote {
            out.push(c);
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => {
                if pending_space {
                    out.push(' ');
                }
                pending_space = false;
                quote = Some(c);
                out.push(c);
            }
            c if c.is_whitespace() => pending_space = true,
            ',' => {
                out.push(',');
                pending_space = true;
            }
            _ => {
                if pending_space && !out.is_empty() {
                    out.push(' ');
                }
                pending_space = false;
                out.push(c);
                // unquoted url() bodies are kept verbatim
                if c == '(' && out.to_ascii_lowercase().ends_with("url(") {
                    quote = Some(')');
                }
            }
        }
    }
    out
}

fn format_declaration(text: &str) -> String {
    if text.starts_with('@') {
        return normalize_value(text);
    }
    match text.split_once(':') {
        Some((property, value)) => {
            format!("{}: {}", property.trim(), normalize_value(value))
        }
        None => normalize_value(text),
    }
}

/// Split a selector list at top-level commas and space out combinators
fn selector_parts(selector: &str) -> Vec<String> {
    let collapsed = selector.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.starts_with('@') {
        return vec![collapsed];
    }

    let mut parts = Vec::new();
    let mut current = String::new();
    let mut nesting = 0usize;
    for c in collapsed.chars() {
        match c {
            '(' | '[' => {
                nesting += 1;
                current.push(c);
            }
            ')' | ']' => {
                nesting = nesting.saturating_sub(1);
                current.push(c);
            }
            ',' if nesting == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            '>' | '+' | '~' if nesting == 0 => {
                let trimmed = current.trim_end().len();
                current.truncate(trimmed);
                current.push(' ');
                current.push(c);
                current.push(' ');
            }
            ' ' if current.ends_with(' ') => {}
            _ => current.push(c),
        }
    }
    parts.push(current.trim().to_string());
    parts.retain(|p| !p.is_empty());
    parts
}

/// Reformat a stylesheet with the given indent width
pub fn beautify(source: &str, indent: usize) -> String {
    let chars: Vec<char> = source.chars().collect();
    let mut printer = Printer::spaces(indent);
    let mut buffer = String::new();
    let mut depth = 0usize;
    let mut parens = 0usize;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '/' && chars.get(i + 1) == Some(&'*') {
            let end = (i + 2..chars.len().saturating_sub(1))
                .find(|&j| chars[j] == '*' && chars[j + 1] == '/')
                .map_or(chars.len(), |j| j + 2);
            let comment: String = chars[i..end].iter().collect();
            printer.newline(depth);
            printer.write(&comment, false);
            printer.newline(depth);
            i = end;
            continue;
        }

        match c {
            '"' | '\'' => {
                let mut j = i + 1;
                while j < chars.len() && chars[j] != c {
                    j += if chars[j] == '\\' { 2 } else { 1 };
                }
                let end = (j + 1).min(chars.len());
                buffer.extend(&chars[i..end]);
                i = end;
                continue;
            }
            '(' => parens += 1,
            ')' => parens = parens.saturating_sub(1),
            '{' if parens == 0 => {
                let parts = selector_parts(&buffer);
                let last = parts.len().saturating_sub(1);
                printer.newline(depth);
                for (n, part) in parts.iter().enumerate() {
                    printer.newline(depth);
                    printer.write(part, false);
                    if n < last {
                        printer.write(",", false);
                    }
                }
                printer.write("{", true);
                depth += 1;
                printer.newline(depth);
                buffer.clear();
                i += 1;
                continue;
            }
            ';' if parens == 0 => {
                let declaration = buffer.trim();
                if !declaration.is_empty() {
                    printer.newline(depth);
                    printer.write(&format_declaration(declaration), false);
                    printer.write(";", false);
                }
                buffer.clear();
                i += 1;
                continue;
            }
            '}' if parens == 0 => {
                let declaration = buffer.trim();
                if !declaration.is_empty() {
                    printer.newline(depth);
                    printer.write(&format_declaration(declaration), false);
                }
                buffer.clear();
                depth = depth.saturating_sub(1);
                printer.newline(depth);
                printer.write("}", false);
                if depth == 0 {
                    printer.blank_line();
                }
                i += 1;
                continue;
            }
            _ => {}
        }

        buffer.push(c);
        i += 1;
    }

    let rest = buffer.trim();
    if !rest.is_empty() {
        printer.newline(depth);
        printer.write(&normalize_value(rest), false);
    }
    printer.finish()
}
