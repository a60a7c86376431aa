//! Line and character level text tools

mod convert;

pub use convert::convert;

use std::cmp::Ordering;
use std::collections::HashSet;

use rand::seq::SliceRandom;

use crate::types::{ToolOptions, ToolResult};
use super::error::{HandlerResult, ToolError};
use super::regex_tester::Flags;
use super::support::{parse_float_prefix, utf16_len};

/// `\w` as the UI's regex engine defines it
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_word = false;
    for c in input.chars() {
        if c.is_whitespace() {
            in_word = false;
            out.push(c);
        } else if in_word {
            out.extend(c.to_lowercase());
        } else if is_word_char(c) {
            in_word = true;
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Lower-case everything, then capitalise the first word character of the
/// text and of each sentence following `.`, `!` or `?`
fn sentence_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending = true;
    for c in input.to_lowercase().chars() {
        if matches!(c, '.' | '!' | '?') {
            pending = true;
            out.push(c);
        } else if pending && is_word_char(c) {
            pending = false;
            out.extend(c.to_uppercase());
        } else {
            if pending && !c.is_whitespace() {
                pending = false;
            }
            out.push(c);
        }
    }
    out
}

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Drop each run of non-alphanumerics and upper-case the character after it
fn camel_case(input: &str) -> String {
    let chars: Vec<char> = input.to_lowercase().chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i].is_ascii_alphanumeric() {
            out.push(chars[i]);
            i += 1;
            continue;
        }

        let run_end = (i..chars.len())
            .find(|&j| chars[j].is_ascii_alphanumeric())
            .unwrap_or(chars.len());
        // The run gives back characters until one can be capitalised
        let target = (i + 1..=run_end)
            .rev()
            .find(|&m| m < chars.len() && !is_line_terminator(chars[m]));

        match target {
            Some(m) => {
                out.extend(chars[m].to_uppercase());
                i = m + 1;
            }
            None => {
                out.push(chars[i]);
                i += 1;
            }
        }
    }
    out
}

/// Split `fooBar` boundaries and separator runs with `sep`, then lower-case
fn delimited_case(input: &str, sep: char, separators: impl Fn(char) -> bool) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut split = String::with_capacity(input.len() + 8);
    for (i, c) in chars.iter().enumerate() {
        split.push(*c);
        if c.is_ascii_lowercase() && chars.get(i + 1).is_some_and(|n| n.is_ascii_uppercase()) {
            split.push(sep);
        }
    }

    let mut out = String::with_capacity(split.len());
    let mut in_run = false;
    for c in split.chars() {
        if separators(c) {
            if !in_run {
                out.push(sep);
            }
            in_run = true;
        } else {
            in_run = false;
            out.push(c);
        }
    }
    out.to_lowercase()
}

/// `text:case`
pub fn case(input: &str, options: &ToolOptions) -> HandlerResult {
    let kind = options.str_or("type", "upper");

    let output = match kind {
        "upper" => input.to_uppercase(),
        "lower" => input.to_lowercase(),
        "title" => title_case(input),
        "sentence" => sentence_case(input),
        "camel" => camel_case(input),
        "snake" => delimited_case(input, '_', |c| c.is_whitespace() || c == '-'),
        "kebab" => delimited_case(input, '-', |c| c.is_whitespace() || c == '_'),
        "reverse" => input.chars().rev().collect(),
        _ => input.to_string(),
    };

    Ok(ToolResult::success(output.as_str())
        .with_metadata("inputLength", utf16_len(input))
        .with_metadata("outputLength", utf16_len(&output))
        .with_metadata("transformation", kind))
}

/// Case-insensitive comparison with lower case ordered first on ties
fn natural_compare(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

/// Leading decimal number of a line; anything unparsable is 0
fn leading_number(line: &str) -> f64 {
    parse_float_prefix(line).unwrap_or(0.0)
}

/// `text:sort`
pub fn sort(input: &str, options: &ToolOptions) -> HandlerResult {
    let order = options.str_or("order", "asc");
    let mode = options.str_or("mode", "line");
    let descending = order != "asc";

    let mut lines: Vec<&str> = input.split('\n').collect();
    let directed = |ord: Ordering| if descending { ord.reverse() } else { ord };

    match mode {
        "line" => lines.sort_by(|a, b| directed(natural_compare(a, b))),
        "numeric" => lines.sort_by(|a, b| {
            directed(
                leading_number(a)
                    .partial_cmp(&leading_number(b))
                    .unwrap_or(Ordering::Equal),
            )
        }),
        "length" => lines.sort_by(|a, b| directed(utf16_len(a).cmp(&utf16_len(b)))),
        "shuffle" => lines.shuffle(&mut rand::thread_rng()),
        _ => {}
    }

    Ok(ToolResult::success(lines.join("\n"))
        .with_metadata("lineCount", lines.len())
        .with_metadata("mode", mode)
        .with_metadata("order", order))
}

/// `text:filter`
pub fn filter(input: &str, options: &ToolOptions) -> HandlerResult {
    let lines: Vec<&str> = input.split('\n').collect();

    let flags = Flags {
        case_insensitive: !options.flag("caseSensitive", false),
        ..Flags::default()
    };
    let pattern = match options.str("pattern") {
        Some(pattern) => Some(
            flags
                .build(pattern)
                .map_err(|e| ToolError::invalid(format!("Invalid regular expression: {}", e)))?,
        ),
        None => None,
    };
    let exclude = options.str("match") == Some("exclude");
    let remove_empty = options.flag("removeEmpty", false);
    let unique = options.flag("unique", false);
    let min_length = options.number("minLength");
    let max_length = options.number("maxLength");

    let mut matching = Vec::with_capacity(lines.len());
    for line in lines.iter().copied() {
        if remove_empty && line.trim().is_empty() {
            continue;
        }
        let keep = match &pattern {
            Some(regex) => regex.is_match(line).map_err(ToolError::other)? != exclude,
            None => true,
        };
        if keep {
            matching.push(line);
        }
    }

    let mut seen = HashSet::new();
    let filtered: Vec<&str> = matching
        .into_iter()
        .filter(|line| !unique || seen.insert(*line))
        .filter(|line| min_length.map_or(true, |min| utf16_len(line) as f64 >= min))
        .filter(|line| max_length.map_or(true, |max| utf16_len(line) as f64 <= max))
        .collect();

    Ok(ToolResult::success(filtered.join("\n"))
        .with_metadata("filteredLines", filtered.len())
        .with_metadata("originalLines", lines.len())
        .with_metadata("removedLines", lines.len() - filtered.len()))
}

fn escape_markup(input: &str, apostrophe: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str(apostrophe),
            _ => out.push(c),
        }
    }
    out
}

fn escape_with(input: &str, table: &[(char, &str)]) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match table.iter().find(|(from, _)| *from == c) {
            Some((_, to)) => out.push_str(to),
            None => out.push(c),
        }
    }
    out
}

/// `text:escape`
pub fn escape(input: &str, options: &ToolOptions) -> HandlerResult {
    let kind = options.str_or("type", "html");

    let output = match kind {
        "html" => escape_markup(input, "&#039;"),
        "xml" => escape_markup(input, "&apos;"),
        "json" => serde_json::to_string(input)?,
        "csv" => escape_with(input, &[('"', "\"\""), (',', "\\,"), ('\n', "\\n")]),
        "java" => escape_with(
            input,
            &[
                ('\\', "\\\\"),
                ('"', "\\\""),
                ('\'', "\\'"),
                ('\n', "\\n"),
                ('\r', "\\r"),
                ('\t', "\\t"),
            ],
        ),
        _ => input.to_string(),
    };

    Ok(ToolResult::success(output).with_metadata("escapeType", kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run_case(input: &str, kind: &str) -> String {
        case(input, &ToolOptions::new().with("type", kind))
            .unwrap()
            .output_str()
            .to_string()
    }

    #[test]
    fn test_case_transforms() {
        assert_eq!(run_case("hello world", "upper"), "HELLO WORLD");
        assert_eq!(run_case("HELLO WORLD", "lower"), "hello world");
        assert_eq!(run_case("hello wORLD (again)", "title"), "Hello World (Again)");
        assert_eq!(run_case("hello WORLD. how ARE you?", "sentence"), "Hello world. How are you?");
        assert_eq!(run_case("hello-world-test", "camel"), "helloWorldTest");
        assert_eq!(run_case("Hello World Test", "camel"), "helloWorldTest");
        assert_eq!(run_case("helloWorldTest", "snake"), "hello_world_test");
        assert_eq!(run_case("hello world-test", "snake"), "hello_world_test");
        assert_eq!(run_case("helloWorldTest", "kebab"), "hello-world-test");
        assert_eq!(run_case("hello__world", "kebab"), "hello-world");
        assert_eq!(run_case("hello", "reverse"), "olleh");
        assert_eq!(run_case("hello world", "unknown"), "hello world");
    }

    #[test]
    fn test_case_metadata() {
        let result = case("hello", &ToolOptions::new().with("type", "upper")).unwrap();
        assert_eq!(result.meta("inputLength"), Some(&json!(5)));
        assert_eq!(result.meta("outputLength"), Some(&json!(5)));
        assert_eq!(result.meta("transformation"), Some(&json!("upper")));
    }

    fn run_sort(input: &str, options: serde_json::Value) -> String {
        sort(input, &ToolOptions::from_value(options))
            .unwrap()
            .output_str()
            .to_string()
    }

    #[test]
    fn test_sort_modes() {
        assert_eq!(run_sort("zebra\napple\nbanana", json!({})), "apple\nbanana\nzebra");
        assert_eq!(run_sort("zebra\napple\nbanana", json!({"order": "desc"})), "zebra\nbanana\napple");
        assert_eq!(run_sort("b\nB\na\nA", json!({})), "a\nA\nb\nB");
        assert_eq!(run_sort("10\n2\n1\n20", json!({"mode": "numeric"})), "1\n2\n10\n20");
        assert_eq!(
            run_sort("10\n2\n1\n20", json!({"mode": "numeric", "order": "desc"})),
            "20\n10\n2\n1"
        );
        assert_eq!(run_sort("a\nbb\nccc\nd", json!({"mode": "length"})), "a\nd\nbb\nccc");
        assert_eq!(
            run_sort("a\nbb\nccc\nd", json!({"mode": "length", "order": "desc"})),
            "ccc\nbb\na\nd"
        );
        assert_eq!(run_sort("banana\napple", json!({"mode": "unknown"})), "banana\napple");
    }

    #[test]
    fn test_shuffle_keeps_lines() {
        let output = run_sort("apple\nbanana\ncherry", json!({"mode": "shuffle"}));
        let mut lines: Vec<_> = output.lines().collect();
        lines.sort();
        assert_eq!(lines, vec!["apple", "banana", "cherry"]);
    }

    #[test]
    fn test_leading_number() {
        assert_eq!(leading_number("42abc"), 42.0);
        assert_eq!(leading_number("  -1.5e2 items"), -150.0);
        assert_eq!(leading_number("3e"), 3.0);
        assert_eq!(leading_number("abc"), 0.0);
        assert_eq!(leading_number("."), 0.0);
    }

    fn run_filter(input: &str, options: serde_json::Value) -> ToolResult {
        filter(input, &ToolOptions::from_value(options)).unwrap()
    }

    #[test]
    fn test_filter_rules() {
        assert_eq!(
            run_filter("line1\n   \nline2\n\nline3", json!({"removeEmpty": true})).output_str(),
            "line1\nline2\nline3"
        );
        assert_eq!(
            run_filter("apple\nbanana\napricot\ncherry", json!({"pattern": "ap"})).output_str(),
            "apple\napricot"
        );
        assert_eq!(
            run_filter("apple\nbanana\napricot\ncherry", json!({"pattern": "ap", "match": "exclude"}))
                .output_str(),
            "banana\ncherry"
        );
        assert_eq!(
            run_filter("Apple\napple\nAPPLE", json!({"pattern": "apple", "caseSensitive": true})).output_str(),
            "apple"
        );
        assert_eq!(
            run_filter("Apple\napple\nAPPLE", json!({"pattern": "apple"})).output_str(),
            "Apple\napple\nAPPLE"
        );
        assert_eq!(
            run_filter("apple\nbanana\napple\ncherry\nbanana", json!({"unique": true})).output_str(),
            "apple\nbanana\ncherry"
        );
        assert_eq!(run_filter("a\nbb\nccc\ndddd", json!({"minLength": 3})).output_str(), "ccc\ndddd");
        assert_eq!(run_filter("a\nbb\nccc\ndddd", json!({"maxLength": 2})).output_str(), "a\nbb");
        assert_eq!(run_filter("a\nbb", json!({"maxLength": 0})).output_str(), "a\nbb");
    }

    #[test]
    fn test_filter_metadata_and_bad_pattern() {
        let result = run_filter("line1\n\nline3", json!({"removeEmpty": true}));
        assert_eq!(result.meta("originalLines"), Some(&json!(3)));
        assert_eq!(result.meta("filteredLines"), Some(&json!(2)));
        assert_eq!(result.meta("removedLines"), Some(&json!(1)));

        assert!(filter("x", &ToolOptions::new().with("pattern", "(")).is_err());
    }

    #[test]
    fn test_filter_lookahead_and_backreference() {
        assert_eq!(
            run_filter("100px\n100em\n5px", json!({"pattern": r"\d+(?=px)"})).output_str(),
            "100px\n5px"
        );
        assert_eq!(
            run_filter("book\ncat\nbee", json!({"pattern": r"(\w)\1"})).output_str(),
            "book\nbee"
        );
    }

    fn run_escape(input: &str, kind: &str) -> String {
        escape(input, &ToolOptions::new().with("type", kind))
            .unwrap()
            .output_str()
            .to_string()
    }

    #[test]
    fn test_escapes() {
        assert_eq!(
            run_escape("<div>Hello & 'World'</div>", "html"),
            "&lt;div&gt;Hello &amp; &#039;World&#039;&lt;/div&gt;"
        );
        assert_eq!(run_escape("it's", "xml"), "it&apos;s");
        assert_eq!(run_escape("Hello \"World\"", "json"), r#""Hello \"World\"""#);
        assert_eq!(run_escape("a,\"b\"\nc", "csv"), "a\\,\"\"b\"\"\\nc");
        assert_eq!(run_escape("Line1\nLine2\tTab\\", "java"), "Line1\\nLine2\\tTab\\\\");
    }
}
