//! Identifier, password, placeholder-text and image generators

mod barcode;
mod qr;

pub use barcode::generate as barcode;
pub use qr::generate as qrcode;

use rand::Rng;
use uuid::Uuid;

use crate::types::{ToolOptions, ToolResult};
use super::error::{HandlerResult, ToolError};

/// Upper bound for the `count` option of every generator
const MAX_COUNT: usize = 100;

const NANOID_LENGTH: (usize, usize) = (1, 100);
const PASSWORD_LENGTH: (usize, usize) = (4, 128);

const NANOID_ALPHABET: &str = "_-0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

const PASSWORD_UPPER: &str = "ABCDEFGHJKLMNPQRSTUVWXYZ";
const PASSWORD_LOWER: &str = "abcdefghjkmnpqrstuvwxyz";
const PASSWORD_DIGITS: &str = "23456789";
const PASSWORD_SYMBOLS: &str = "!@#$%^&*()-_=+[]{}|;:,.<>?";
const PASSWORD_SIMILAR: &str = "il1Lo0O";
const PASSWORD_FALLBACK: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

fn count(options: &ToolOptions) -> usize {
    options.count_or("count", 1).min(MAX_COUNT)
}

/// `uuid:generate`: v1 (time + random node) or v4
pub fn uuid(_input: &str, options: &ToolOptions) -> HandlerResult {
    let version = options.str_or("version", "4");
    let count = count(options);

    let ids: Vec<String> = (0..count)
        .map(|_| {
            if version == "1" {
                Uuid::now_v1(&rand::random::<[u8; 6]>()).to_string()
            } else {
                Uuid::new_v4().to_string()
            }
        })
        .collect();

    Ok(ToolResult::success(ids.join("\n"))
        .with_metadata("count", count)
        .with_metadata("format", "standard")
        .with_metadata("version", format!("v{}", version)))
}

/// `ulid:generate`
pub fn ulid(_input: &str, options: &ToolOptions) -> HandlerResult {
    let count = count(options);
    let ids: Vec<String> = (0..count).map(|_| ulid::Ulid::new().to_string()).collect();

    Ok(ToolResult::success(ids.join("\n"))
        .with_metadata("count", count)
        .with_metadata("sortable", true))
}

/// `nanoid:generate` with an optional custom alphabet
pub fn nanoid(_input: &str, options: &ToolOptions) -> HandlerResult {
    let length = options.count_in("length", 21, NANOID_LENGTH.0, NANOID_LENGTH.1);
    let count = count(options);
    let alphabet: Vec<char> = options.str_or("alphabet", NANOID_ALPHABET).chars().collect();

    if alphabet.len() > 255 {
        return Err(ToolError::invalid("Alphabet must contain at most 255 characters"));
    }

    let ids: Vec<String> = (0..count)
        .map(|_| match alphabet.as_slice() {
            [only] => only.to_string().repeat(length),
            chars => nanoid::format(nanoid::rngs::default, chars, length),
        })
        .collect();

    Ok(ToolResult::success(ids.join("\n"))
        .with_metadata("alphabetSize", alphabet.len())
        .with_metadata("count", count)
        .with_metadata("length", length))
}

/// Character classes a password may draw from
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pub uppercase: bool,
    pub lowercase: bool,
    pub numbers: bool,
    pub symbols: bool,
    pub exclude_similar: bool,
    pub exclude: String,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            uppercase: true,
            lowercase: true,
            numbers: true,
            symbols: true,
            exclude_similar: true,
            exclude: String::new(),
        }
    }
}

impl PasswordPolicy {
    fn from_options(options: &ToolOptions) -> Self {
        Self {
            uppercase: options.flag("uppercase", true),
            lowercase: options.flag("lowercase", true),
            numbers: options.flag("numbers", true),
            symbols: options.flag("symbols", true),
            exclude_similar: options.flag("excludeSimilar", true),
            exclude: options.str_or("exclude", "").to_string(),
        }
    }

    /// Final character set; falls back to alphanumerics when everything was excluded
    pub fn charset(&self) -> Vec<char> {
        let classes = [
            (self.uppercase, PASSWORD_UPPER),
            (self.lowercase, PASSWORD_LOWER),
            (self.numbers, PASSWORD_DIGITS),
            (self.symbols, PASSWORD_SYMBOLS),
        ];
        let chars: Vec<char> = classes
            .iter()
            .filter(|(on, _)| *on)
            .flat_map(|(_, set)| set.chars())
            .filter(|c| !(self.exclude_similar && PASSWORD_SIMILAR.contains(*c)))
            .filter(|c| !self.exclude.contains(*c))
            .collect();

        if chars.is_empty() {
            PASSWORD_FALLBACK.chars().collect()
        } else {
            chars
        }
    }

    /// Draw a password from the OS-seeded thread RNG
    pub fn generate(&self, length: usize) -> String {
        let charset = self.charset();
        let mut rng = rand::thread_rng();
        (0..length)
            .map(|_| charset[rng.gen_range(0..charset.len())])
            .collect()
    }
}

/// `password:generate`
pub fn password(_input: &str, options: &ToolOptions) -> HandlerResult {
    let length = options.count_in("length", 16, PASSWORD_LENGTH.0, PASSWORD_LENGTH.1);
    let count = count(options);
    let policy = PasswordPolicy::from_options(options);

    let passwords: Vec<String> = (0..count).map(|_| policy.generate(length)).collect();

    Ok(ToolResult::success(passwords.join("\n"))
        .with_metadata("count", count)
        .with_metadata("length", length)
        .with_metadata("lowercase", policy.lowercase)
        .with_metadata("numbers", policy.numbers)
        .with_metadata("symbols", policy.symbols)
        .with_metadata("uppercase", policy.uppercase))
}

fn lorem_words(rng: &mut impl Rng, count: usize) -> Vec<String> {
    lipsum::lipsum_words_with_rng(&mut *rng, count)
        .split_whitespace()
        .map(|w| {
            w.chars()
                .filter(|c| c.is_alphabetic())
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect()
}

fn lorem_sentence(rng: &mut impl Rng) -> String {
    let len = rng.gen_range(5..=15);
    let words = lorem_words(rng, len).join(" ");
    let mut chars = words.chars();
    match chars.next() {
        Some(first) => format!("{}{}.", first.to_uppercase(), chars.as_str()),
        None => String::new(),
    }
}

fn lorem_paragraph(rng: &mut impl Rng) -> String {
    let len = rng.gen_range(3..=7);
    (0..len).map(|_| lorem_sentence(rng)).collect::<Vec<_>>().join(" ")
}

/// `lorem:generate`: words, sentences or paragraphs
pub fn lorem(_input: &str, options: &ToolOptions) -> HandlerResult {
    let count = count(options);
    let kind = options.str_or("type", "words");
    let mut rng = rand::thread_rng();

    let output = match kind {
        "paragraphs" => (0..count)
            .map(|_| lorem_paragraph(&mut rng))
            .collect::<Vec<_>>()
            .join("\n"),
        "sentences" => (0..count)
            .map(|_| lorem_sentence(&mut rng))
            .collect::<Vec<_>>()
            .join(" "),
        _ => lorem_words(&mut rng, count).join(" "),
    };

    Ok(ToolResult::success(output)
        .with_metadata("count", count)
        .with_metadata("type", kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    fn opts(value: serde_json::Value) -> ToolOptions {
        ToolOptions::from_value(value)
    }

    #[test]
    fn test_uuid_versions() {
        let v4 = uuid("", &ToolOptions::new()).unwrap();
        let parsed = Uuid::parse_str(v4.output_str()).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
        assert_eq!(v4.meta("version"), Some(&json!("v4")));

        let v1 = uuid("", &opts(json!({"version": "1", "count": 5}))).unwrap();
        let ids: Vec<_> = v1.output_str().lines().collect();
        assert_eq!(ids.len(), 5);
        for id in ids {
            assert_eq!(Uuid::parse_str(id).unwrap().get_version_num(), 1);
        }
    }

    #[test]
    fn test_uuid_count_is_unique_and_capped() {
        let result = uuid("", &opts(json!({"count": 100}))).unwrap();
        let unique: HashSet<_> = result.output_str().lines().collect();
        assert_eq!(unique.len(), 100);

        let capped = uuid("", &opts(json!({"count": 5000}))).unwrap();
        assert_eq!(capped.output_str().lines().count(), MAX_COUNT);
    }

    #[test]
    fn test_ulid_format() {
        let result = ulid("", &opts(json!({"count": 5}))).unwrap();
        let ids: Vec<_> = result.output_str().lines().collect();
        assert_eq!(ids.len(), 5);
        for id in ids {
            assert_eq!(id.len(), 26);
            assert!(id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn test_nanoid() {
        let default = nanoid("", &ToolOptions::new()).unwrap();
        assert_eq!(default.output_str().len(), 21);

        let custom = nanoid("", &opts(json!({"length": 10, "alphabet": "ABC", "count": 5}))).unwrap();
        for id in custom.output_str().lines() {
            assert_eq!(id.len(), 10);
            assert!(id.chars().all(|c| "ABC".contains(c)));
        }
        assert_eq!(custom.meta("alphabetSize"), Some(&json!(3)));

        let single = nanoid("", &opts(json!({"length": 4, "alphabet": "x"}))).unwrap();
        assert_eq!(single.output_str(), "xxxx");

        let long = nanoid("", &opts(json!({"length": 1e9}))).unwrap();
        assert_eq!(long.output_str().len(), 100);
        assert_eq!(long.meta("length"), Some(&json!(100)));
    }

    #[test]
    fn test_password_length_is_clamped() {
        let long = password("", &opts(json!({"length": 100000}))).unwrap();
        assert_eq!(long.output_str().chars().count(), 128);
        assert_eq!(long.meta("length"), Some(&json!(128)));

        let short = password("", &opts(json!({"length": 2}))).unwrap();
        assert_eq!(short.output_str().chars().count(), 4);
    }

    #[test]
    fn test_password_policy() {
        let result = password("", &opts(json!({"length": 32, "numbers": false, "symbols": false}))).unwrap();
        let pw = result.output_str();
        assert_eq!(pw.chars().count(), 32);
        assert!(pw.chars().all(|c| c.is_ascii_alphabetic()));

        let lower_only = password(
            "",
            &opts(json!({"uppercase": false, "numbers": false, "symbols": false})),
        )
        .unwrap();
        assert!(lower_only.output_str().chars().all(|c| c.is_ascii_lowercase()));
        assert!(!lower_only.output_str().contains('l'));
    }

    #[test]
    fn test_password_charset_fallback() {
        let policy = PasswordPolicy {
            uppercase: false,
            lowercase: false,
            numbers: false,
            symbols: false,
            ..PasswordPolicy::default()
        };
        assert_eq!(policy.charset().len(), 62);

        let policy = PasswordPolicy {
            exclude: "ABC".to_string(),
            ..PasswordPolicy::default()
        };
        assert!(!policy.charset().contains(&'A'));
    }

    #[test]
    fn test_lorem() {
        let words = lorem("", &opts(json!({"count": 10}))).unwrap();
        assert!(words.output_str().split(' ').count() <= 10);

        let sentences = lorem("", &opts(json!({"count": 3, "type": "sentences"}))).unwrap();
        assert!(sentences.output_str().split(". ").count() >= 2);
        assert!(sentences.output_str().ends_with('.'));

        let paragraphs = lorem("", &opts(json!({"count": 3, "type": "paragraphs"}))).unwrap();
        assert!(paragraphs.output_str().len() > 100);
        assert_eq!(paragraphs.output_str().lines().count(), 3);
    }
}
