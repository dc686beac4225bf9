//! Operation input and its mapping onto the provider request.
//!
//! The JSON shape is the one callers of `amazonses.email_send` already use:
//!
//! ```json
//! {
//!   "email": {
//!     "from":     { "email_id": "a@x.com" },
//!     "to":       { "email_id": "b@x.com,c@x.com" },
//!     "cc":       { "email_id": "d@x.com" },
//!     "reply_to": { "email_id": "r@x.com" },
//!     "subject":  "Hi",
//!     "message":  "<b>hi</b>",
//!     "attachments": { "file": [ { "name": "f.txt", "path": "/tmp/f.txt" } ] },
//!     "vendor":   { "key": "AKIA...", "secret": "...", "region": "ap-south-1" }
//!   },
//!   "notification_object_type": "order",
//!   "notification_object_id": 42
//! }
//! ```

use mailbridge_aws::{AwsCredentials, AwsRegion, Destination, RawEmail, SimpleEmail};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{MailError, MailResult};
use crate::mime;

/// Region used when the vendor block names none.
pub const DEFAULT_REGION: &str = "ap-south-1";

// ── Input types ─────────────────────────────────────────────────────────

/// `{ "email_id": "..." }`; lists are comma-separated in `email_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressField {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_id: Option<String>,
}

impl AddressField {
    pub fn new(email_id: &str) -> Self {
        Self {
            email_id: Some(email_id.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// File name announced in `Content-Disposition`.
    #[serde(default)]
    pub name: String,
    /// Local path read at send time; empty paths are skipped.
    #[serde(default)]
    pub path: String,
}

impl Attachment {
    pub fn new(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentList {
    /// `null` reads as an empty list.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub file: Vec<Attachment>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Provider credentials carried with each request. The secret is accepted
/// on input and never written back out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vendor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing)]
    pub secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<AddressField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<AddressField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cc: Option<AddressField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bcc: Option<AddressField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<AddressField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// HTML body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<AttachmentList>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<Vendor>,
}

/// All attributes of the `amazonses.email_send` operation.
///
/// Only `email` drives the send. The other attributes are accepted in any
/// JSON shape and only show up in log records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailSendParams {
    pub email: Option<EmailRequest>,
    pub log: Option<Value>,
    pub notification_object_type: Option<Value>,
    pub notification_object_id: Option<Value>,
    pub tracking_set: Option<Value>,
}

impl EmailSendParams {
    pub fn from_value(attrs: Value) -> MailResult<Self> {
        serde_json::from_value(attrs).map_err(|e| MailError::invalid_params(e.to_string()))
    }

    /// `type:id` of the notification object, for log context.
    pub fn notification_ref(&self) -> Option<String> {
        let kind = self.notification_object_type.as_ref().map(plain_text)?;
        let id = self
            .notification_object_id
            .as_ref()
            .map(plain_text)
            .unwrap_or_default();
        Some(format!("{}:{}", kind, id))
    }
}

/// Strings without their JSON quotes, anything else as JSON text.
fn plain_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// What is actually handed to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderRequest {
    Structured(SimpleEmail),
    Raw(RawEmail),
}

// ── Validation and mapping ──────────────────────────────────────────────

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn address(field: &Option<AddressField>) -> Option<&str> {
    field.as_ref().and_then(|f| f.email_id.as_deref())
}

/// Split on `,` exactly as given: no trimming, no syntax checks.
pub fn split_addresses(list: &str) -> Vec<String> {
    list.split(',').map(str::to_string).collect()
}

impl EmailRequest {
    /// Reject the request if sender, recipient, subject or message is
    /// missing or empty, naming the first one that is.
    pub fn validate(&self) -> MailResult<()> {
        if non_empty(address(&self.from)).is_none() {
            return Err(MailError::missing_field("Sender email address is missing."));
        }
        if non_empty(address(&self.to)).is_none() {
            return Err(MailError::missing_field("Recipient email address is missing."));
        }
        if non_empty(self.subject.as_deref()).is_none() {
            return Err(MailError::missing_field("Subject is missing."));
        }
        if non_empty(self.message.as_deref()).is_none() {
            return Err(MailError::missing_field("Message is missing."));
        }
        Ok(())
    }

    /// Credentials and region from the vendor block. Key and secret must
    /// both be non-empty; the region falls back to `default_region`.
    pub fn resolve_vendor(&self, default_region: &str) -> MailResult<(AwsCredentials, AwsRegion)> {
        let vendor = self.vendor.clone().unwrap_or_default();
        let key = non_empty(vendor.key.as_deref());
        let secret = non_empty(vendor.secret.as_deref());
        let (Some(key), Some(secret)) = (key, secret) else {
            return Err(MailError::missing_credentials(
                "AWS credentials are not provided, check your settings!",
            ));
        };
        let region = non_empty(vendor.region.as_deref()).unwrap_or(default_region);
        Ok((AwsCredentials::new(key, secret), AwsRegion::new(region)))
    }

    /// Map onto the structured `SendEmail` shape. CC and BCC are carried
    /// whenever present, Reply-To only when non-empty.
    pub fn to_simple_email(&self) -> MailResult<SimpleEmail> {
        self.validate()?;

        let reply_to = non_empty(address(&self.reply_to)).map(split_addresses);
        Ok(SimpleEmail {
            source: address(&self.from).unwrap_or_default().to_string(),
            destination: Destination {
                to_addresses: split_addresses(address(&self.to).unwrap_or_default()),
                cc_addresses: address(&self.cc).map(split_addresses),
                bcc_addresses: address(&self.bcc).map(split_addresses),
            },
            reply_to_addresses: reply_to,
            subject: self.subject.clone().unwrap_or_default(),
            html_body: self.message.clone().unwrap_or_default(),
        })
    }

    pub fn attachments(&self) -> &[Attachment] {
        self.attachments
            .as_ref()
            .map(|a| a.file.as_slice())
            .unwrap_or(&[])
    }

    pub fn has_attachments(&self) -> bool {
        !self.attachments().is_empty()
    }

    /// Structured request, or a raw MIME document when attachments exist.
    /// Attachment files are read here.
    pub fn to_provider_request(&self) -> MailResult<ProviderRequest> {
        let simple = self.to_simple_email()?;
        if self.has_attachments() {
            let raw = mime::build_raw_message(&simple, self.attachments())?;
            Ok(ProviderRequest::Raw(RawEmail::new(raw)))
        } else {
            Ok(ProviderRequest::Structured(simple))
        }
    }
}
