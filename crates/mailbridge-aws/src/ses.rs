//! Amazon SES client (`SendEmail`, `SendRawEmail`).
//!
//! SES v1 speaks the AWS Query protocol with XML responses
//! (API version 2010-12-01).
//!
//! Reference: <https://docs.aws.amazon.com/ses/latest/APIReference/>

use crate::client::{self, AwsClient};
use crate::config::{AwsCredentials, AwsRegion, ProviderConfig};
use crate::error::{AwsError, AwsResult};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const API_VERSION: &str = "2010-12-01";
const SERVICE: &str = "ses";
const CHARSET: &str = "UTF-8";

// ── Types ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub to_addresses: Vec<String>,
    /// `None` when the caller gave no CC; `Some` is sent even if it holds
    /// empty entries.
    pub cc_addresses: Option<Vec<String>>,
    pub bcc_addresses: Option<Vec<String>>,
}

/// Structured message for `SendEmail`: HTML body, UTF-8 subject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleEmail {
    pub source: String,
    pub destination: Destination,
    pub reply_to_addresses: Option<Vec<String>>,
    pub subject: String,
    pub html_body: String,
}

/// Pre-built MIME document for `SendRawEmail`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEmail {
    pub data: Vec<u8>,
}

impl RawEmail {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendEmailOutput {
    pub message_id: String,
    pub request_id: Option<String>,
}

// ── SES Client ──────────────────────────────────────────────────────────

pub struct SesClient {
    client: AwsClient,
}

impl SesClient {
    pub fn new(client: AwsClient) -> Self {
        Self { client }
    }

    /// Client signed with static credentials for `region`.
    pub fn from_credentials(
        credentials: AwsCredentials,
        region: AwsRegion,
        config: &ProviderConfig,
    ) -> Self {
        Self::new(AwsClient::new(credentials, region, SERVICE, config))
    }

    pub fn region_name(&self) -> &str {
        self.client.region_name()
    }

    pub async fn send_email(&self, email: &SimpleEmail) -> AwsResult<SendEmailOutput> {
        let params = send_email_params(email);
        let response = self.client.query_request(SERVICE, &params).await?;
        parse_send_output("SendEmail", &response.body, response.request_id)
    }

    pub async fn send_raw_email(&self, raw: &RawEmail) -> AwsResult<SendEmailOutput> {
        if raw.data.is_empty() {
            return Err(
                AwsError::validation(SERVICE, "Raw message data is empty").with_action("SendRawEmail")
            );
        }
        let params = send_raw_email_params(raw);
        let response = self.client.query_request(SERVICE, &params).await?;
        parse_send_output("SendRawEmail", &response.body, response.request_id)
    }
}

// ── Request / response mapping ──────────────────────────────────────────

pub fn send_email_params(email: &SimpleEmail) -> BTreeMap<String, String> {
    let mut params = client::build_query_params("SendEmail", API_VERSION);
    params.insert("Source".to_string(), email.source.clone());
    client::add_member_list(
        &mut params,
        "Destination.ToAddresses",
        &email.destination.to_addresses,
    );
    if let Some(ref cc) = email.destination.cc_addresses {
        client::add_member_list(&mut params, "Destination.CcAddresses", cc);
    }
    if let Some(ref bcc) = email.destination.bcc_addresses {
        client::add_member_list(&mut params, "Destination.BccAddresses", bcc);
    }
    if let Some(ref reply_to) = email.reply_to_addresses {
        client::add_member_list(&mut params, "ReplyToAddresses", reply_to);
    }
    params.insert("Message.Subject.Data".to_string(), email.subject.clone());
    params.insert("Message.Subject.Charset".to_string(), CHARSET.to_string());
    params.insert("Message.Body.Html.Data".to_string(), email.html_body.clone());
    params.insert("Message.Body.Html.Charset".to_string(), CHARSET.to_string());
    params
}

/// The Query protocol carries the raw blob base64-encoded.
pub fn send_raw_email_params(raw: &RawEmail) -> BTreeMap<String, String> {
    let mut params = client::build_query_params("SendRawEmail", API_VERSION);
    params.insert(
        "RawMessage.Data".to_string(),
        base64::engine::general_purpose::STANDARD.encode(&raw.data),
    );
    params
}

fn parse_send_output(
    action: &str,
    body: &str,
    request_id: Option<String>,
) -> AwsResult<SendEmailOutput> {
    match client::xml_text(body, "MessageId") {
        Some(message_id) if !message_id.is_empty() => Ok(SendEmailOutput {
            message_id,
            request_id,
        }),
        _ => Err(AwsError::new(
            SERVICE,
            "MissingMessageId",
            &format!("{} response did not contain a MessageId", action),
            200,
        )
        .with_action(action)),
    }
}
