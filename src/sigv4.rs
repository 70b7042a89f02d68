// ABOUTME: AWS Signature Version 4 signing for Bedrock control and runtime requests
// ABOUTME: Produces Authorization/x-amz-* headers over method, path, query and payload hash
//
// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 dravr.ai

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use url::Url;

use crate::types::ProbeError;

/// Signing name shared by the `bedrock` and `bedrock-runtime` endpoints
const SERVICE: &str = "bedrock";

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

type HmacSha256 = Hmac<Sha256>;

/// Key material for one signature
#[derive(Debug, Clone, Copy)]
pub struct SigningKey<'a> {
    /// Access key id
    pub access_key_id: &'a str,
    /// Secret access key
    pub secret_access_key: &'a str,
    /// Session token for temporary credentials
    pub session_token: Option<&'a str>,
    /// Region the request is sent to
    pub region: &'a str,
}

/// Headers to attach to a signed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    /// `Authorization` header value
    pub authorization: String,
    /// `x-amz-date` header value
    pub amz_date: String,
    /// `x-amz-content-sha256` header value
    pub payload_hash: String,
    /// `x-amz-security-token` header value
    pub security_token: Option<String>,
}

impl SignedHeaders {
    /// Header name/value pairs in the order they should be sent
    #[must_use]
    pub fn pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = vec![
            ("authorization", self.authorization.as_str()),
            ("x-amz-date", self.amz_date.as_str()),
            ("x-amz-content-sha256", self.payload_hash.as_str()),
        ];
        if let Some(token) = &self.security_token {
            pairs.push(("x-amz-security-token", token.as_str()));
        }
        pairs
    }
}

/// Sign a request
///
/// `content-type` is always signed as `application/json`; callers must send
/// that exact header.
///
/// # Errors
///
/// Returns an internal error if the URL has no host or HMAC setup fails.
pub fn sign(
    method: &str,
    url: &Url,
    payload: &[u8],
    key: &SigningKey<'_>,
    now: DateTime<Utc>,
) -> Result<SignedHeaders, ProbeError> {
    let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
    let date_stamp = now.format("%Y%m%d").to_string();
    let payload_hash = sha256_hex(payload);

    let mut canonical_headers = vec![
        ("content-type", "application/json".to_owned()),
        ("host", canonical_host(url)?),
        ("x-amz-content-sha256", payload_hash.clone()),
        ("x-amz-date", amz_date.clone()),
    ];
    if let Some(token) = key.session_token {
        canonical_headers.push(("x-amz-security-token", token.to_owned()));
    }
    canonical_headers.sort_by(|left, right| left.0.cmp(right.0));

    let signed_headers = canonical_headers
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(";");

    let mut header_block = String::new();
    for (name, value) in &canonical_headers {
        let _ = writeln!(&mut header_block, "{name}:{}", value.trim());
    }

    let canonical_request = format!(
        "{method}\n{}\n{}\n{header_block}\n{signed_headers}\n{payload_hash}",
        canonical_uri(url),
        canonical_query(url),
    );
    let credential_scope = format!("{date_stamp}/{}/{SERVICE}/aws4_request", key.region);
    let string_to_sign = format!(
        "{ALGORITHM}\n{amz_date}\n{credential_scope}\n{}",
        sha256_hex(canonical_request.as_bytes())
    );
    let signature = hex_encode(&derive_signature(
        key.secret_access_key,
        &date_stamp,
        key.region,
        &string_to_sign,
    )?);

    Ok(SignedHeaders {
        authorization: format!(
            "{ALGORITHM} Credential={}/{credential_scope}, SignedHeaders={signed_headers}, Signature={signature}",
            key.access_key_id
        ),
        amz_date,
        payload_hash,
        security_token: key.session_token.map(ToOwned::to_owned),
    })
}

fn canonical_host(url: &Url) -> Result<String, ProbeError> {
    let host = url
        .host_str()
        .ok_or_else(|| ProbeError::internal(format!("Endpoint URL has no host: {url}")))?;
    Ok(url
        .port()
        .map_or_else(|| host.to_owned(), |port| format!("{host}:{port}")))
}

/// Path segments are taken in their URL-encoded form and encoded once more
/// (so `%3A` in the URL becomes `%253A`).
fn canonical_uri(url: &Url) -> String {
    let segments = url
        .path_segments()
        .map(|parts| parts.map(aws_percent_encode).collect::<Vec<_>>())
        .unwrap_or_default();

    if segments.is_empty() {
        "/".to_owned()
    } else {
        format!("/{}", segments.join("/"))
    }
}

fn canonical_query(url: &Url) -> String {
    let mut pairs = url
        .query_pairs()
        .map(|(key, value)| (aws_percent_encode(&key), aws_percent_encode(&value)))
        .collect::<Vec<_>>();
    pairs.sort();
    pairs
        .into_iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Percent-encode with the SigV4 unreserved set (`A-Z a-z 0-9 - _ . ~`)
pub(crate) fn aws_percent_encode(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            encoded.push(char::from(byte));
        } else {
            let _ = write!(&mut encoded, "%{byte:02X}");
        }
    }
    encoded
}

fn derive_signature(
    secret_access_key: &str,
    date_stamp: &str,
    region: &str,
    string_to_sign: &str,
) -> Result<Vec<u8>, ProbeError> {
    let key_date = hmac_sha256(
        format!("AWS4{secret_access_key}").as_bytes(),
        date_stamp.as_bytes(),
    )?;
    let key_region = hmac_sha256(&key_date, region.as_bytes())?;
    let key_service = hmac_sha256(&key_region, SERVICE.as_bytes())?;
    let key_signing = hmac_sha256(&key_service, b"aws4_request")?;
    hmac_sha256(&key_signing, string_to_sign.as_bytes())
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, ProbeError> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(key)
        .map_err(|e| ProbeError::internal(format!("Failed to initialize HMAC: {e}")))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

fn sha256_hex(bytes: &[u8]) -> String {
    hex_encode(&Sha256::digest(bytes))
}

fn hex_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(&mut out, "{byte:02x}");
    }
    out
}
