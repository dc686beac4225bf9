//! The send operation.

use serde_json::Value;

use crate::error::{MailError, MailResult};
use crate::hooks::{HookDecision, LifecycleHooks, NoopHooks};
use crate::provider::ProviderFactory;
use crate::request::{EmailRequest, EmailSendParams, ProviderRequest, DEFAULT_REGION};
use crate::result::{SendOutcome, SendResult};

/// Runs one send per call. Holds no per-call state, so a single sender can
/// serve concurrent calls.
pub struct EmailSender<F, H = NoopHooks> {
    factory: F,
    hooks: H,
    default_region: String,
}

impl<F: ProviderFactory> EmailSender<F, NoopHooks> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            hooks: NoopHooks,
            default_region: DEFAULT_REGION.to_string(),
        }
    }
}

impl<F: ProviderFactory, H: LifecycleHooks> EmailSender<F, H> {
    pub fn with_hooks<H2: LifecycleHooks>(self, hooks: H2) -> EmailSender<F, H2> {
        EmailSender {
            factory: self.factory,
            hooks,
            default_region: self.default_region,
        }
    }

    pub fn with_default_region(mut self, region: &str) -> Self {
        self.default_region = region.to_string();
        self
    }

    pub fn default_region(&self) -> &str {
        &self.default_region
    }

    /// Decode raw operation attributes, then send. Attributes that do not
    /// decode produce an `invalid_params` error result. Hooks take decoded
    /// params, so neither hook runs in that case.
    pub async fn send_value(&self, attrs: Value) -> SendOutcome {
        match EmailSendParams::from_value(attrs) {
            Ok(params) => self.send(&params).await,
            Err(err) => {
                log::warn!("email_send: {}", err);
                SendOutcome::Completed(SendResult::from(err))
            }
        }
    }

    pub async fn send(&self, params: &EmailSendParams) -> SendOutcome {
        let context = params.notification_ref().unwrap_or_else(|| "-".to_string());

        if self.hooks.pre_action(params).await == HookDecision::Abort {
            log::info!("email_send [{}]: aborted by pre-action hook", context);
            return SendOutcome::Aborted;
        }

        let Some(ref email) = params.email else {
            log::debug!("email_send [{}]: no email attribute, skipping", context);
            return SendOutcome::Skipped;
        };

        let result = match self.dispatch(email).await {
            Ok(message_id) => {
                log::info!("email_send [{}]: accepted as {}", context, message_id);
                SendResult::success(message_id, email.clone())
            }
            Err(err) => {
                log::warn!("email_send [{}]: {}", context, err);
                SendResult::from(err)
            }
        };

        SendOutcome::Completed(self.hooks.post_action(result).await)
    }

    async fn dispatch(&self, email: &EmailRequest) -> MailResult<String> {
        email.validate()?;
        let (credentials, region) = email.resolve_vendor(&self.default_region)?;
        let request = email.to_provider_request()?;

        let provider = self.factory.build(credentials, region);
        let output = match request {
            ProviderRequest::Structured(ref simple) => {
                log::debug!(
                    "sending structured email to {} recipient(s)",
                    simple.destination.to_addresses.len()
                );
                provider.send_email(simple).await
            }
            ProviderRequest::Raw(ref raw) => {
                log::debug!("sending raw email ({} bytes)", raw.data.len());
                provider.send_raw_email(raw).await
            }
        };
        output.map(|out| out.message_id).map_err(MailError::from)
    }
}
