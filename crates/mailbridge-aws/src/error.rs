//! Provider error model.
//!
//! SES answers failed Query requests with an `<ErrorResponse>` XML document.
//! [`AwsError`] carries what that document says plus the transport context
//! (HTTP status, request id, action) so the caller can surface the provider's
//! message verbatim.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error returned by any call into the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwsError {
    /// Provider error code (e.g. "MessageRejected", "InvalidClientTokenId").
    pub code: String,
    /// Human-readable message as sent by the provider.
    pub message: String,
    /// HTTP status of the response, 0 when no response was received.
    pub status_code: u16,
    /// Request id from the response body or headers.
    pub request_id: Option<String>,
    /// Service that produced the error ("ses", "http").
    pub service: String,
    /// API action being called when the error happened.
    pub action: Option<String>,
    /// Whether repeating the same request could succeed. Informational only;
    /// this crate never retries.
    pub retryable: bool,
}

impl fmt::Display for AwsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AWS {} error [{}]: {} (HTTP {})",
            self.service, self.code, self.message, self.status_code
        )?;
        if let Some(ref req_id) = self.request_id {
            write!(f, " [RequestId: {}]", req_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for AwsError {}

impl AwsError {
    pub fn new(service: &str, code: &str, message: &str, status_code: u16) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            status_code,
            request_id: None,
            service: service.to_string(),
            action: None,
            retryable: Self::is_transient(code, status_code),
        }
    }

    /// Build a credential error. Raised before any request is signed.
    pub fn credential_error(message: &str) -> Self {
        Self::new("ses", "CredentialError", message, 401)
    }

    /// Build a local validation error for a request that cannot be sent.
    pub fn validation(service: &str, message: &str) -> Self {
        Self::new(service, "ValidationError", message, 400)
    }

    pub fn with_request_id(mut self, id: String) -> Self {
        self.request_id = Some(id);
        self
    }

    pub fn with_action(mut self, action: &str) -> Self {
        self.action = Some(action.to_string());
        self
    }

    fn is_transient(code: &str, status_code: u16) -> bool {
        if matches!(status_code, 429 | 500 | 502 | 503 | 504) {
            return true;
        }
        matches!(
            code,
            "Throttling" | "ThrottlingException" | "ServiceUnavailable" | "InternalFailure"
        )
    }

    /// Parse an AWS Query-protocol XML error body.
    ///
    /// ```xml
    /// <ErrorResponse>
    ///   <Error>
    ///     <Type>Sender</Type>
    ///     <Code>MessageRejected</Code>
    ///     <Message>Email address is not verified.</Message>
    ///   </Error>
    ///   <RequestId>abc-123</RequestId>
    /// </ErrorResponse>
    /// ```
    ///
    /// Bodies that are not XML (proxies, load balancers) still produce an
    /// error carrying the HTTP status.
    pub fn parse_xml_error(service: &str, status_code: u16, body: &str) -> Self {
        let code = crate::client::xml_text(body, "Code")
            .unwrap_or_else(|| "UnknownError".to_string());
        let message = crate::client::xml_text(body, "Message")
            .unwrap_or_else(|| format!("HTTP {} from {}", status_code, service));

        let mut err = Self::new(service, &code, &message, status_code);
        err.request_id = crate::client::xml_text(body, "RequestId");
        err
    }
}

impl From<reqwest::Error> for AwsError {
    fn from(err: reqwest::Error) -> Self {
        Self {
            code: "HttpError".to_string(),
            message: err.to_string(),
            status_code: err.status().map(|s| s.as_u16()).unwrap_or(0),
            request_id: None,
            service: "http".to_string(),
            action: None,
            retryable: err.is_timeout() || err.is_connect(),
        }
    }
}

pub type AwsResult<T> = Result<T, AwsError>;
