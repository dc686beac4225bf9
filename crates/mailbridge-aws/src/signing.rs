//! AWS Signature Version 4.
//!
//! <https://docs.aws.amazon.com/IAM/latest/UserGuide/create-signed-request.html>
//!
//! 1. canonical request
//! 2. string to sign
//! 3. signing key (date → region → service → `aws4_request`)
//! 4. `Authorization` header

use crate::config::AwsCredentials;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// RFC 3986 unreserved characters stay as-is, everything else is escaped.
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Signs requests for one service in one region.
#[derive(Debug, Clone)]
pub struct SigV4Signer {
    credentials: AwsCredentials,
    region: String,
    service: String,
}

impl SigV4Signer {
    pub fn new(credentials: AwsCredentials, region: &str, service: &str) -> Self {
        Self {
            credentials,
            region: region.to_string(),
            service: service.to_string(),
        }
    }

    pub fn credentials(&self) -> &AwsCredentials {
        &self.credentials
    }

    /// Returns `headers` extended with `x-amz-date`, the session token when
    /// present, and `authorization`. Header names must already be lowercase
    /// and include `host`.
    pub fn sign(
        &self,
        method: &str,
        url: &str,
        mut headers: BTreeMap<String, String>,
        body: &[u8],
        at: DateTime<Utc>,
    ) -> BTreeMap<String, String> {
        let amz_date = at.format("%Y%m%dT%H%M%SZ").to_string();
        let date_stamp = at.format("%Y%m%d").to_string();

        headers.insert("x-amz-date".to_string(), amz_date.clone());
        if let Some(ref token) = self.credentials.session_token {
            headers.insert("x-amz-security-token".to_string(), token.clone());
        }

        let canonical = canonical_request(method, url, &headers, &sha256_hex(body));
        let scope = format!(
            "{}/{}/{}/aws4_request",
            date_stamp, self.region, self.service
        );
        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            ALGORITHM,
            amz_date,
            scope,
            sha256_hex(canonical.as_bytes())
        );
        let signature = hex::encode(hmac_sha256(
            &self.signing_key(&date_stamp),
            string_to_sign.as_bytes(),
        ));

        let authorization = format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            ALGORITHM,
            self.credentials.access_key_id,
            scope,
            signed_header_names(&headers),
            signature
        );
        headers.insert("authorization".to_string(), authorization);
        headers
    }

    fn signing_key(&self, date_stamp: &str) -> Vec<u8> {
        let k_secret = format!("AWS4{}", self.credentials.secret_access_key);
        let k_date = hmac_sha256(k_secret.as_bytes(), date_stamp.as_bytes());
        let k_region = hmac_sha256(&k_date, self.region.as_bytes());
        let k_service = hmac_sha256(&k_region, self.service.as_bytes());
        hmac_sha256(&k_service, b"aws4_request")
    }
}

fn canonical_request(
    method: &str,
    url: &str,
    headers: &BTreeMap<String, String>,
    payload_hash: &str,
) -> String {
    let (path, query) = canonical_path_and_query(url);
    let canonical_headers: String = headers
        .iter()
        .map(|(k, v)| format!("{}:{}\n", k, v.trim()))
        .collect();
    format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        method,
        path,
        query,
        canonical_headers,
        signed_header_names(headers),
        payload_hash
    )
}

// BTreeMap keys are already sorted.
fn signed_header_names(headers: &BTreeMap<String, String>) -> String {
    headers.keys().cloned().collect::<Vec<_>>().join(";")
}

fn canonical_path_and_query(url: &str) -> (String, String) {
    let Ok(parsed) = url::Url::parse(url) else {
        return ("/".to_string(), String::new());
    };
    let path = if parsed.path().is_empty() {
        "/".to_string()
    } else {
        parsed
            .path()
            .split('/')
            .map(uri_encode)
            .collect::<Vec<_>>()
            .join("/")
    };
    let mut pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(k, v)| (uri_encode(&k), uri_encode(&v)))
        .collect();
    pairs.sort();
    let query = pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");
    (path, query)
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
pub fn uri_encode(input: &str) -> String {
    utf8_percent_encode(input, UNRESERVED).to_string()
}

/// `application/x-www-form-urlencoded` body for a Query API call.
pub fn form_encode(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", uri_encode(k), uri_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}
