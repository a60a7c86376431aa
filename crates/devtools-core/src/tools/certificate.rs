//! `certificate:analyze`: summary of an X.509 certificate in PEM or base64 DER

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Serialize;
use serde_json::{Map, Value};
use x509_parser::objects::{oid2abbrev, oid2sn, oid_registry};
use x509_parser::oid_registry::Oid;
use x509_parser::prelude::{parse_x509_certificate, X509Certificate, X509Name};

use crate::types::{ToolOptions, ToolResult};
use super::error::HandlerResult;
use super::support::{iso_millis, to_pretty_json};

const PEM_MARKER: &str = "-----BEGIN CERTIFICATE-----";

#[derive(Debug, Serialize)]
struct Extension {
    critical: bool,
    id: String,
    name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Validity {
    not_after: String,
    not_before: String,
    valid: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Report {
    extensions: Vec<Extension>,
    issuer: Map<String, Value>,
    serial_number: String,
    signature_algorithm: String,
    subject: Map<String, Value>,
    validity: Validity,
    version: u32,
}

fn short_name(oid: &Oid) -> String {
    oid2abbrev(oid, oid_registry())
        .map(str::to_string)
        .unwrap_or_else(|_| oid.to_id_string())
}

/// Attributes keyed by short name (`CN`, `O`, ...); later duplicates win
fn name_map(name: &X509Name) -> Map<String, Value> {
    name.iter_attributes()
        .map(|attr| {
            let value = attr.as_str().unwrap_or_default();
            (short_name(attr.attr_type()), Value::from(value))
        })
        .collect()
}

fn common_name(name: &X509Name) -> String {
    name.iter_common_name()
        .next()
        .and_then(|cn| cn.as_str().ok())
        .unwrap_or("N/A")
        .to_string()
}

fn timestamp(seconds: i64) -> String {
    iso_millis(seconds.saturating_mul(1000)).unwrap_or_default()
}

fn report(cert: &X509Certificate<'_>) -> Report {
    let validity = cert.validity();
    Report {
        extensions: cert
            .extensions()
            .iter()
            .map(|ext| Extension {
                critical: ext.critical,
                id: ext.oid.to_id_string(),
                name: oid2sn(&ext.oid, oid_registry())
                    .map(str::to_string)
                    .unwrap_or_else(|_| ext.oid.to_id_string()),
            })
            .collect(),
        issuer: name_map(cert.issuer()),
        serial_number: hex::encode(cert.raw_serial()),
        signature_algorithm: cert.signature_algorithm.algorithm.to_id_string(),
        subject: name_map(cert.subject()),
        validity: Validity {
            not_after: timestamp(validity.not_after.timestamp()),
            not_before: timestamp(validity.not_before.timestamp()),
            valid: validity.is_valid(),
        },
        version: cert.version().0,
    }
}

/// Raw DER bytes from PEM armor or bare base64
fn der_bytes(input: &str) -> Result<Vec<u8>, &'static str> {
    if let Some(start) = input.find(PEM_MARKER) {
        let (_, pem) = x509_parser::pem::parse_x509_pem(input[start..].as_bytes())
            .map_err(|_| "Invalid PEM certificate")?;
        return Ok(pem.contents);
    }
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(compact)
        .map_err(|_| "Invalid certificate format. Use PEM or DER.")
}

/// `certificate:analyze`
pub fn analyze(input: &str, _options: &ToolOptions) -> HandlerResult {
    if input.trim().is_empty() {
        return Ok(ToolResult::failure("Certificate input is required"));
    }

    let der = match der_bytes(input) {
        Ok(der) => der,
        Err(message) => return Ok(ToolResult::failure(message)),
    };
    let Ok((_, cert)) = parse_x509_certificate(&der) else {
        return Ok(ToolResult::failure("Invalid certificate format. Use PEM or DER."));
    };

    let report = report(&cert);
    let valid = report.validity.valid;
    let serial = report.serial_number.clone();

    Ok(ToolResult::success(to_pretty_json(&report, 2)?)
        .with_metadata("issuer", common_name(cert.issuer()))
        .with_metadata("serialNumber", serial)
        .with_metadata("subject", common_name(cert.subject()))
        .with_metadata("valid", valid))
}
