//! Digest and HMAC generator

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};

use crate::types::{ToolOptions, ToolResult};
use super::error::{HandlerResult, ToolError};

fn digest(algorithm: &str, input: &[u8]) -> Vec<u8> {
    match algorithm {
        "md5" => Md5::digest(input).to_vec(),
        "sha1" => Sha1::digest(input).to_vec(),
        "sha512" => Sha512::digest(input).to_vec(),
        _ => Sha256::digest(input).to_vec(),
    }
}

fn mac<M: Mac + hmac::digest::KeyInit>(input: &[u8], secret: &[u8]) -> Result<Vec<u8>, ToolError> {
    let mut mac = <M as Mac>::new_from_slice(secret).map_err(ToolError::other)?;
    mac.update(input);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn hmac_digest(algorithm: &str, input: &[u8], secret: &[u8]) -> Result<Vec<u8>, ToolError> {
    match algorithm {
        "md5" => mac::<Hmac<Md5>>(input, secret),
        "sha1" => mac::<Hmac<Sha1>>(input, secret),
        "sha512" => mac::<Hmac<Sha512>>(input, secret),
        _ => mac::<Hmac<Sha256>>(input, secret),
    }
}

/// `hash:generator`: MD5/SHA digests with optional HMAC secret.
///
/// Unknown algorithms hash with SHA-256 but keep the requested name in the
/// reported algorithm.
pub fn generate(input: &str, options: &ToolOptions) -> HandlerResult {
    let algorithm = options.str_or("algorithm", "sha256");
    let output_format = options.str_or("outputFormat", "hex");
    let upper = options.str("case") == Some("upper");
    let secret = options.str("secret");
    let requested = algorithm.to_lowercase();

    let (bytes, mut name) = match secret {
        Some(secret) => (
            hmac_digest(&requested, input.as_bytes(), secret.as_bytes())?,
            format!("HMAC-{}", algorithm.to_uppercase()),
        ),
        None => (digest(&requested, input.as_bytes()), algorithm.to_uppercase()),
    };

    let mut output = if output_format == "base64" {
        name.push_str(" (Base64)");
        STANDARD.encode(&bytes)
    } else {
        hex::encode(&bytes)
    };
    if upper {
        output = output.to_uppercase();
    }

    Ok(ToolResult::success(output)
        .with_metadata("algorithm", name)
        .with_metadata("case", if upper { "upper" } else { "lower" })
        .with_metadata("hmac", secret.is_some())
        .with_metadata("outputFormat", output_format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(options: serde_json::Value) -> ToolResult {
        generate("Hello World", &ToolOptions::from_value(options)).unwrap()
    }

    #[test]
    fn test_digest_lengths_and_names() {
        for (algorithm, len, name) in [
            ("md5", 32, "MD5"),
            ("sha1", 40, "SHA1"),
            ("sha256", 64, "SHA256"),
            ("sha512", 128, "SHA512"),
        ] {
            let result = run(json!({ "algorithm": algorithm }));
            assert_eq!(result.output_str().len(), len);
            assert_eq!(result.meta("algorithm"), Some(&json!(name)));
        }
    }

    #[test]
    fn test_known_vectors() {
        let result = generate("abc", &ToolOptions::new().with("algorithm", "md5")).unwrap();
        assert_eq!(result.output_str(), "900150983cd24fb0d6963f7d28e17f72");

        let result = generate("", &ToolOptions::new()).unwrap();
        assert_eq!(
            result.output_str(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_hmac() {
        let result = generate(
            "The quick brown fox jumps over the lazy dog",
            &ToolOptions::new().with("secret", "key"),
        )
        .unwrap();
        assert_eq!(
            result.output_str(),
            "f7bc83f430538424b13298e6aa6fb143ef4d59a14946175997479dbc2d1a3cd8"
        );
        assert_eq!(result.meta("algorithm"), Some(&json!("HMAC-SHA256")));
        assert_eq!(result.meta("hmac"), Some(&json!(true)));

        let unknown = run(json!({ "algorithm": "unknown", "secret": "secret" }));
        assert_eq!(unknown.meta("algorithm"), Some(&json!("HMAC-UNKNOWN")));
        assert_eq!(unknown.output_str().len(), 64);
    }

    #[test]
    fn test_base64_and_case() {
        let result = run(json!({ "outputFormat": "base64" }));
        assert_eq!(result.meta("algorithm"), Some(&json!("SHA256 (Base64)")));
        assert!(result.output_str().ends_with('='));

        let upper = run(json!({ "case": "upper" }));
        assert_eq!(upper.output_str(), upper.output_str().to_uppercase());
        assert_eq!(upper.meta("case"), Some(&json!("upper")));
    }
}
