//! `regex:test`: run a pattern against text and list the matches

use fancy_regex::Regex;
use serde::Serialize;

use crate::types::{ToolOptions, ToolResult};
use super::error::{HandlerResult, ToolError};
use super::support::{to_pretty_json, utf16_len};

/// A single match; offsets and lengths count UTF-16 code units
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchDetail {
    pub index: usize,
    pub length: usize,
    #[serde(rename = "match")]
    pub text: String,
    pub position: usize,
}

/// Flags parsed from the `flags` option
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Flags {
    pub global: bool,
    pub case_insensitive: bool,
    pub multi_line: bool,
    pub dot_all: bool,
}

impl Flags {
    /// Parse a flag string such as `gi`; unknown or repeated flags are rejected
    pub fn parse(flags: &str) -> Option<Self> {
        let mut parsed = Flags::default();
        let mut seen = String::new();
        for flag in flags.chars() {
            if seen.contains(flag) {
                return None;
            }
            seen.push(flag);
            match flag {
                'g' => parsed.global = true,
                'i' => parsed.case_insensitive = true,
                'm' => parsed.multi_line = true,
                's' => parsed.dot_all = true,
                'u' => {}
                _ => return None,
            }
        }
        Some(parsed)
    }

    /// Compile `pattern` with these flags; lookaround and backreferences are supported
    pub fn build(&self, pattern: &str) -> Result<Regex, fancy_regex::Error> {
        let inline: String = [
            (self.case_insensitive, 'i'),
            (self.multi_line, 'm'),
            (self.dot_all, 's'),
        ]
        .iter()
        .filter(|(on, _)| *on)
        .map(|(_, flag)| *flag)
        .collect();

        if inline.is_empty() {
            Regex::new(pattern)
        } else {
            Regex::new(&format!("(?{}){}", inline, pattern))
        }
    }
}

/// Every match of `regex` in `text`
pub fn find_matches(regex: &Regex, text: &str) -> Result<Vec<MatchDetail>, ToolError> {
    regex
        .find_iter(text)
        .enumerate()
        .map(|(index, m)| {
            let m = m.map_err(ToolError::other)?;
            Ok(MatchDetail {
                index,
                length: utf16_len(m.as_str()),
                text: m.as_str().to_string(),
                position: utf16_len(&text[..m.start()]),
            })
        })
        .collect()
}

/// `regex:test`
pub fn evaluate(input: &str, options: &ToolOptions) -> HandlerResult {
    let pattern = options.str_or("pattern", "");
    let text = options.str("text").unwrap_or(input);
    let flag_text = options.str_or("flags", "");

    if pattern.is_empty() {
        return Ok(ToolResult::success("No pattern provided")
            .with_error("Regex pattern is required")
            .with_metadata("flags", flag_text)
            .with_metadata("pattern", ""));
    }

    let Some((flags, regex)) = Flags::parse(flag_text).and_then(|f| Some((f, f.build(pattern).ok()?))) else {
        return Ok(ToolResult::failure("Invalid regex pattern"));
    };

    let (output, count) = if flags.global {
        let matches = find_matches(&regex, text)?;
        if matches.is_empty() {
            ("No matches found".to_string(), 0)
        } else {
            (to_pretty_json(&matches, 2)?, matches.len())
        }
    } else {
        match regex.find(text).map_err(ToolError::other)? {
            Some(m) => (format!("Match: {}", m.as_str()), 1),
            None => ("No matches found".to_string(), 0),
        }
    };

    Ok(ToolResult::success(output)
        .with_metadata("flags", flag_text)
        .with_metadata("matchCount", count)
        .with_metadata("pattern", pattern))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn run(input: &str, pattern: &str, flags: &str) -> ToolResult {
        let options = ToolOptions::new().with("pattern", pattern).with("flags", flags);
        evaluate(input, &options).unwrap()
    }

    #[test]
    fn test_single_match() {
        let result = run("test@example.com", r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$", "");
        assert_eq!(result.output_str(), "Match: test@example.com");
        assert_eq!(result.meta("matchCount"), Some(&json!(1)));

        let named = run("John Doe", r"(?<first>\w+) (?<last>\w+)", "");
        assert_eq!(named.output_str(), "Match: John Doe");
        assert_eq!(run("HELLO world", "hello", "i").output_str(), "Match: HELLO");
    }

    #[test]
    fn test_global_matches() {
        let result = run("abc123def456", r"\d+", "g");
        let matches: Value = serde_json::from_str(result.output_str()).unwrap();
        assert_eq!(
            matches,
            json!([
                { "index": 0, "length": 3, "match": "123", "position": 3 },
                { "index": 1, "length": 3, "match": "456", "position": 9 }
            ])
        );
        assert_eq!(result.meta("matchCount"), Some(&json!(2)));
    }

    #[test]
    fn test_positions_of_repeated_matches() {
        let result = run("Test test TEST", "test", "gi");
        let matches: Value = serde_json::from_str(result.output_str()).unwrap();
        let positions: Vec<_> = matches.as_array().unwrap().iter().map(|m| m["position"].clone()).collect();
        assert_eq!(positions, vec![json!(0), json!(5), json!(10)]);
    }

    #[test]
    fn test_multi_line_flag() {
        let result = run("line1\nline2\nline3", r"^line\d+$", "gm");
        assert_eq!(result.meta("matchCount"), Some(&json!(3)));
        assert_eq!(run("line1\nline2", r"^line\d+$", "g").output_str(), "No matches found");
    }

    #[test]
    fn test_word_boundary() {
        let result = run("test testing tested", r"\btest\b", "g");
        assert_eq!(result.output_str().matches("test").count(), 1);
    }

    #[test]
    fn test_no_matches() {
        assert_eq!(run("no match here", r"\d+", "").output_str(), "No matches found");
        assert_eq!(run("", r"\w+", "g").output_str(), "No matches found");
    }

    #[test]
    fn test_text_option_wins() {
        let options = ToolOptions::new().with("pattern", "b+").with("text", "abbbc");
        let result = evaluate("zzz", &options).unwrap();
        assert_eq!(result.output_str(), "Match: bbb");
    }

    #[test]
    fn test_missing_pattern() {
        let result = run("test text", "", "");
        assert!(result.success);
        assert_eq!(result.output_str(), "No pattern provided");
        assert_eq!(result.error.as_deref(), Some("Regex pattern is required"));
    }

    #[test]
    fn test_invalid_pattern_or_flags() {
        let result = run("test", "[invalid(", "");
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Invalid regex pattern"));
        assert!(!run("test", "t", "gg").success);
        assert!(!run("test", "t", "x").success);
    }

    #[test]
    fn test_utf16_offsets() {
        let result = run("héllo wörld", "w.rld", "g");
        let matches: Value = serde_json::from_str(result.output_str()).unwrap();
        assert_eq!(matches[0]["position"], json!(6));
        assert_eq!(matches[0]["length"], json!(5));

        // astral characters take two code units
        let result = run("😀😀 ab", "ab", "g");
        let matches: Value = serde_json::from_str(result.output_str()).unwrap();
        assert_eq!(matches[0]["position"], json!(5));
        assert_eq!(run("x😀", ".", "g").meta("matchCount"), Some(&json!(2)));
    }

    #[test]
    fn test_lookaround_and_backreferences() {
        let result = run("100px aa $5 7", r"\d+(?=px)", "g");
        let matches: Value = serde_json::from_str(result.output_str()).unwrap();
        assert_eq!(matches, json!([{ "index": 0, "length": 3, "match": "100", "position": 0 }]));

        assert_eq!(run("100px aa $5 7", r"(\w)\1", "").output_str(), "Match: 00");

        let result = run("100px aa $5 7", r"(?<!\$)\b\d+", "g");
        let matches: Value = serde_json::from_str(result.output_str()).unwrap();
        let found: Vec<_> = matches.as_array().unwrap().iter().map(|m| m["match"].clone()).collect();
        assert_eq!(found, vec![json!("100"), json!("7")]);
    }
}
