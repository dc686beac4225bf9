//! Error type for the send operation.

use std::fmt;
use std::path::Path;

use mailbridge_aws::AwsError;
use serde::{Deserialize, Serialize};

/// Kinds of send errors. The serialized names are what callers see in the
/// `kind` field of an error result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MailErrorKind {
    /// Sender, recipient, subject or message absent or empty.
    MissingField,
    /// Vendor key or secret absent or empty.
    MissingCredentials,
    /// The provider rejected the call or could not be reached.
    ProviderError,
    /// An attachment path could not be read.
    FileReadError,
    /// Operation attributes could not be decoded.
    InvalidParams,
}

impl fmt::Display for MailErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailError {
    pub kind: MailErrorKind,
    pub message: String,
    /// Provider error code, for `ProviderError`.
    pub code: Option<String>,
    /// Provider request id, for `ProviderError`.
    pub request_id: Option<String>,
}

impl MailError {
    pub fn new(kind: MailErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            message: msg.into(),
            code: None,
            request_id: None,
        }
    }

    pub fn missing_field(msg: impl Into<String>) -> Self {
        Self::new(MailErrorKind::MissingField, msg)
    }

    pub fn missing_credentials(msg: impl Into<String>) -> Self {
        Self::new(MailErrorKind::MissingCredentials, msg)
    }

    pub fn file_read(path: &Path, err: &std::io::Error) -> Self {
        Self::new(
            MailErrorKind::FileReadError,
            format!("{}: {}", path.display(), err),
        )
    }

    pub fn invalid_params(msg: impl Into<String>) -> Self {
        Self::new(MailErrorKind::InvalidParams, msg)
    }
}

impl fmt::Display for MailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(ref code) => write!(f, "[{}] {}: {}", self.kind, code, self.message),
            None => write!(f, "[{}] {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for MailError {}

/// The provider's message text is kept verbatim.
impl From<AwsError> for MailError {
    fn from(err: AwsError) -> Self {
        Self {
            kind: MailErrorKind::ProviderError,
            message: err.message,
            code: Some(err.code),
            request_id: err.request_id,
        }
    }
}

pub type MailResult<T> = Result<T, MailError>;
