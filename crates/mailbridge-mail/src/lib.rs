//! **mailbridge-mail**: the `email_send` operation.
//!
//! # Modules
//!
//! | Module | Purpose |
//! |---|---|
//! | [`request`] | Operation attributes, validation, mapping onto the provider request |
//! | [`mime`] | Raw `multipart/mixed` builder for messages with attachments |
//! | [`provider`] | Provider seam and the SES-backed implementation |
//! | [`send`] | `EmailSender`: hooks, validation, dispatch, result shaping |
//! | [`result`] | `SendResult` / `SendOutcome` handed back to callers |
//! | [`hooks`] | Pre/post lifecycle hooks |
//! | [`error`] | `MailError` and its kinds |

pub mod error;
pub mod request;
pub mod mime;
pub mod provider;
pub mod result;
pub mod hooks;
pub mod send;

pub use error::{MailError, MailErrorKind, MailResult};
pub use hooks::{HookDecision, LifecycleHooks, NoopHooks};
pub use provider::{EmailProvider, ProviderFactory, SesProvider, SesProviderFactory};
pub use request::{
    AddressField, Attachment, AttachmentList, EmailRequest, EmailSendParams, ProviderRequest,
    Vendor, DEFAULT_REGION,
};
pub use result::{DeliveryStage, SendOutcome, SendResult, Tracking};
pub use send::EmailSender;
