//! Base64, Base32, URL and JWT tools

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD, URL_SAFE_NO_PAD};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use data_encoding::{BASE32, BASE32_NOPAD};
use jsonwebtoken::{Algorithm, EncodingKey};
use serde_json::{Map, Value};

use crate::types::{ToolOptions, ToolResult};
use super::error::{HandlerResult, ToolError};
use super::support::{is_truthy, iso_millis, to_pretty_json, utf16_len};

/// Decoder that accepts missing padding and stray trailing bits
const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

const LENIENT_URL_SAFE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

const MIME_LINE_WIDTH: usize = 76;

fn is_base64_text(text: &str, url_safe: bool) -> bool {
    let body = text.trim_end_matches('=');
    if text.len() - body.len() > 2 {
        return false;
    }
    body.chars().all(|c| {
        c.is_ascii_alphanumeric()
            || matches!(c, '+' | '/')
            || (url_safe && matches!(c, '-' | '_'))
    })
}

fn wrap_lines(text: &str, width: usize) -> String {
    text.as_bytes()
        .chunks(width)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join("\n")
}

/// `base64`: encode or decode (standard, URL-safe unpadded, MIME wrapped)
pub fn base64(input: &str, options: &ToolOptions) -> HandlerResult {
    let mode = options.str_or("mode", "encode");
    let kind = options.str_or("type", "standard");

    let output = if mode == "decode" {
        let clean: String = if kind == "mime" {
            input.chars().filter(|c| !c.is_whitespace()).collect()
        } else {
            input.to_string()
        };

        if !is_base64_text(&clean, kind == "url") {
            return Ok(ToolResult::failure("Invalid base64 input")
                .with_metadata("inputLength", utf16_len(input))
                .with_metadata("mode", mode)
                .with_metadata("outputLength", 0)
                .with_metadata("type", kind));
        }

        let bytes = if kind == "url" {
            LENIENT_URL_SAFE.decode(clean.replace('+', "-").replace('/', "_"))
        } else {
            LENIENT_STANDARD.decode(&clean)
        }
        .map_err(|_| ToolError::invalid("Invalid base64 input"))?;

        String::from_utf8_lossy(&bytes).into_owned()
    } else if kind == "url" {
        URL_SAFE_NO_PAD.encode(input)
    } else if kind == "mime" {
        wrap_lines(&STANDARD.encode(input), MIME_LINE_WIDTH)
    } else {
        STANDARD.encode(input)
    };

    Ok(ToolResult::success(output.as_str())
        .with_metadata("inputLength", utf16_len(input))
        .with_metadata("mode", mode)
        .with_metadata("outputLength", utf16_len(&output))
        .with_metadata("type", kind))
}

/// `base32`: RFC 4648 with padding
pub fn base32(input: &str, options: &ToolOptions) -> HandlerResult {
    let mode = options.str_or("mode", "encode");

    let output = if mode == "decode" {
        let clean: String = input
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_uppercase();
        let bytes = BASE32_NOPAD
            .decode(clean.trim_end_matches('=').as_bytes())
            .map_err(|_| ToolError::invalid("Invalid base32 input"))?;
        String::from_utf8_lossy(&bytes).into_owned()
    } else {
        BASE32.encode(input.as_bytes())
    };

    Ok(ToolResult::success(output.as_str())
        .with_metadata("inputLength", utf16_len(input))
        .with_metadata("mode", mode)
        .with_metadata("outputLength", utf16_len(&output)))
}

/// Percent-encode everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`
fn encode_uri_component(input: &str) -> String {
    urlencoding::encode(input)
        .replace("%21", "!")
        .replace("%27", "'")
        .replace("%28", "(")
        .replace("%29", ")")
        .replace("%2A", "*")
}

fn decode_uri_component(input: &str) -> Result<String, ToolError> {
    let bytes = input.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b == b'%' {
            let valid = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !valid {
                return Err(ToolError::invalid("URI malformed"));
            }
        }
    }
    urlencoding::decode(input)
        .map(|s| s.into_owned())
        .map_err(|_| ToolError::invalid("URI malformed"))
}

/// `url`: component encoding
pub fn url(input: &str, options: &ToolOptions) -> HandlerResult {
    let mode = options.str_or("mode", "encode");

    let output = if mode == "decode" {
        decode_uri_component(input)?
    } else {
        encode_uri_component(input)
    };

    Ok(ToolResult::success(output.as_str())
        .with_metadata("inputLength", utf16_len(input))
        .with_metadata("mode", mode)
        .with_metadata("outputLength", utf16_len(&output)))
}

fn decode_jwt_segment(segment: &str) -> Result<Value, ToolError> {
    let bytes = LENIENT_URL_SAFE
        .decode(segment)
        .map_err(|_| ToolError::invalid("Invalid JWT token encoding"))?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn claim_or_na(payload: &Value, claim: &str) -> Value {
    match payload.get(claim) {
        Some(value) if is_truthy(value) => value.clone(),
        _ => Value::from("N/A"),
    }
}

/// `jwt`: decode a token or sign a payload with HS256
pub fn jwt(input: &str, options: &ToolOptions) -> HandlerResult {
    let mode = options.str_or("mode", "decode");
    if mode == "decode" {
        jwt_decode(input, mode)
    } else {
        jwt_encode(input, options, mode)
    }
}

fn jwt_decode(input: &str, mode: &str) -> HandlerResult {
    if input.is_empty() {
        return Ok(ToolResult::failure("Input is required"));
    }

    let parts: Vec<&str> = input.split('.').collect();
    if parts.len() != 3 {
        return Ok(ToolResult::failure("Invalid JWT token format"));
    }

    let header = decode_jwt_segment(parts[0])?;
    let payload = decode_jwt_segment(parts[1])?;

    let expires_at = match payload.get("exp").and_then(Value::as_f64) {
        Some(exp) if exp != 0.0 => iso_millis((exp * 1000.0) as i64)
            .ok_or_else(|| ToolError::invalid("Invalid time value"))?,
        _ => "N/A".to_string(),
    };

    let mut result = ToolResult::success(to_pretty_json(
        &serde_json::json!({ "header": header, "payload": payload }),
        2,
    )?);
    if let Some(alg) = header.get("alg") {
        result = result.with_metadata("algorithm", alg.clone());
    }
    result = result
        .with_metadata("expiresAt", expires_at)
        .with_metadata("issuer", claim_or_na(&payload, "iss"))
        .with_metadata("mode", mode)
        .with_metadata("subject", claim_or_na(&payload, "sub"));
    if let Some(typ) = header.get("typ") {
        result = result.with_metadata("type", typ.clone());
    }
    Ok(result)
}

fn jwt_encode(input: &str, options: &ToolOptions, mode: &str) -> HandlerResult {
    let payload: Value = serde_json::from_str(input)?;
    let secret = options.str_or("secret", "secret");

    let (payload_bytes, is_object) = match payload {
        Value::Object(mut claims) => {
            if !claims.contains_key("iat") {
                claims.insert("iat".to_string(), Value::from(chrono::Utc::now().timestamp()));
            }
            (serde_json::to_vec(&claims)?, true)
        }
        Value::String(text) => (text.into_bytes(), false),
        _ => return Err(ToolError::invalid("JWT payload must be a JSON object or string")),
    };

    let mut header = Map::new();
    header.insert("alg".to_string(), Value::from("HS256"));
    if is_object {
        header.insert("typ".to_string(), Value::from("JWT"));
    }
    if let Some(custom) = options.str("header") {
        match serde_json::from_str::<Value>(custom)? {
            Value::Object(fields) => header.extend(fields),
            _ => return Err(ToolError::invalid("JWT header must be a JSON object")),
        }
    }
    // Signing is always HS256, whatever the custom header claims
    header.insert("alg".to_string(), Value::from("HS256"));

    let message = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?),
        URL_SAFE_NO_PAD.encode(payload_bytes)
    );
    let signature = jsonwebtoken::crypto::sign(
        message.as_bytes(),
        &EncodingKey::from_secret(secret.as_bytes()),
        Algorithm::HS256,
    )
    .map_err(ToolError::other)?;

    Ok(ToolResult::success(format!("{}.{}", message, signature))
        .with_metadata("algorithm", "HS256")
        .with_metadata("mode", mode)
        .with_metadata("secret", "***"))
}
