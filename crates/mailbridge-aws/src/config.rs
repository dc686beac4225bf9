//! Credentials, region and HTTP settings for the SES client.

use crate::error::{AwsError, AwsResult};
use serde::{Deserialize, Serialize};
use std::fmt;

// ── Regions ─────────────────────────────────────────────────────────────

/// Regions where SES accepts `SendEmail` / `SendRawEmail`.
pub const SES_REGIONS: &[&str] = &[
    "us-east-1",
    "us-east-2",
    "us-west-1",
    "us-west-2",
    "af-south-1",
    "ap-south-1",
    "ap-south-2",
    "ap-southeast-1",
    "ap-southeast-2",
    "ap-southeast-3",
    "ap-northeast-1",
    "ap-northeast-2",
    "ap-northeast-3",
    "ca-central-1",
    "eu-central-1",
    "eu-central-2",
    "eu-west-1",
    "eu-west-2",
    "eu-west-3",
    "eu-south-1",
    "eu-north-1",
    "il-central-1",
    "me-south-1",
    "me-central-1",
    "sa-east-1",
    "us-gov-east-1",
    "us-gov-west-1",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AwsRegion {
    /// Region code (e.g. "ap-south-1").
    pub name: String,
}

impl AwsRegion {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    /// Endpoint for a service in this region.
    ///
    /// SES is signed as `ses` but served from `email.<region>`.
    pub fn endpoint(&self, service: &str) -> String {
        let host_prefix = match service {
            "ses" => "email",
            other => other,
        };
        if self.name.starts_with("cn-") {
            format!("https://{}.{}.amazonaws.com.cn", host_prefix, self.name)
        } else {
            format!("https://{}.{}.amazonaws.com", host_prefix, self.name)
        }
    }

    /// Whether SES is known to operate in this region. Unknown regions are
    /// still used as given; the provider has the final word.
    pub fn is_ses_region(&self) -> bool {
        SES_REGIONS.contains(&self.name.as_str())
    }
}

// ── Credentials ─────────────────────────────────────────────────────────

/// Static credentials supplied with each request.
#[derive(Clone, Serialize, Deserialize)]
pub struct AwsCredentials {
    pub access_key_id: String,
    #[serde(skip_serializing)]
    pub secret_access_key: String,
    #[serde(default, skip_serializing)]
    pub session_token: Option<String>,
}

impl AwsCredentials {
    pub fn new(access_key_id: &str, secret_access_key: &str) -> Self {
        Self {
            access_key_id: access_key_id.to_string(),
            secret_access_key: secret_access_key.to_string(),
            session_token: None,
        }
    }

    pub fn with_session_token(mut self, token: &str) -> Self {
        self.session_token = Some(token.to_string());
        self
    }

    /// Both the key id and the secret must be non-empty.
    pub fn validate(&self) -> AwsResult<()> {
        if self.access_key_id.is_empty() {
            return Err(AwsError::credential_error("Access key ID is required"));
        }
        if self.secret_access_key.is_empty() {
            return Err(AwsError::credential_error("Secret access key is required"));
        }
        Ok(())
    }
}

// Secrets stay out of logs and panic messages.
impl fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

// ── HTTP settings ───────────────────────────────────────────────────────

/// Transport settings shared by every client built for a request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProviderConfig {
    /// Endpoint override (LocalStack, a recording proxy, ...).
    pub endpoint_url: Option<String>,
    /// Whole-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// TCP/TLS connect timeout in seconds.
    pub connect_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint_url: None,
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            user_agent: concat!("mailbridge/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
