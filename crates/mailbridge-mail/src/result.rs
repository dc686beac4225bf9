//! Outcome of a send, as handed back to the caller.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{MailError, MailErrorKind};
use crate::request::EmailRequest;

/// Delivery stage reported on success. Only the hand-off to the provider is
/// observable here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStage {
    SentToProvider,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tracking {
    /// Provider message id.
    pub id: String,
    pub status: DeliveryStage,
    pub stage: DeliveryStage,
}

impl Tracking {
    pub fn sent_to_provider(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: DeliveryStage::SentToProvider,
            stage: DeliveryStage::SentToProvider,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SendResult {
    /// The provider accepted the message. `input` echoes the request with
    /// the credential secret left out.
    Success {
        tracking: Tracking,
        input: EmailRequest,
    },
    Error {
        kind: MailErrorKind,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },
}

impl SendResult {
    pub fn success(message_id: impl Into<String>, input: EmailRequest) -> Self {
        SendResult::Success {
            tracking: Tracking::sent_to_provider(message_id),
            input,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SendResult::Success { .. })
    }

    pub fn message_id(&self) -> Option<&str> {
        match self {
            SendResult::Success { tracking, .. } => Some(&tracking.id),
            SendResult::Error { .. } => None,
        }
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl From<MailError> for SendResult {
    fn from(err: MailError) -> Self {
        SendResult::Error {
            kind: err.kind,
            message: err.message,
            code: err.code,
            request_id: err.request_id,
        }
    }
}

/// What one invocation of the send operation produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// No `email` attribute; nothing was attempted.
    Skipped,
    /// The pre-action hook stopped the send.
    Aborted,
    Completed(SendResult),
}

impl SendOutcome {
    pub fn result(&self) -> Option<&SendResult> {
        match self {
            SendOutcome::Completed(result) => Some(result),
            _ => None,
        }
    }

    /// Wire form: the result object, or `null` when nothing was sent.
    pub fn into_json(self) -> Value {
        match self {
            SendOutcome::Completed(result) => result.to_json(),
            SendOutcome::Skipped | SendOutcome::Aborted => Value::Null,
        }
    }
}
