//! Registry adapters for the mail operations.

use std::sync::Arc;

use async_trait::async_trait;
use mailbridge_mail::{EmailSender, LifecycleHooks, NoopHooks, ProviderFactory, SesProviderFactory};
use serde_json::Value;

use crate::config::MailerConfig;
use crate::registry::{ServiceHandler, ServiceRegistry};

pub const EMAIL_SEND_SERVICE: &str = "amazonses.email_send";
pub const EMAIL_SEND_DESCRIPTION: &str = "Send Amazon SES mail";

/// `amazonses.email_send`: decodes the attributes and runs one send.
pub struct EmailSendHandler<F, H = NoopHooks> {
    sender: EmailSender<F, H>,
}

impl<F, H> EmailSendHandler<F, H> {
    pub fn new(sender: EmailSender<F, H>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl<F, H> ServiceHandler for EmailSendHandler<F, H>
where
    F: ProviderFactory + 'static,
    H: LifecycleHooks + 'static,
{
    async fn call(&self, attrs: Value) -> Value {
        self.sender.send_value(attrs).await.into_json()
    }
}

/// Register the email-send operation using `factory` and `hooks`.
pub fn register_email_send<F, H>(
    registry: &mut ServiceRegistry,
    config: &MailerConfig,
    factory: F,
    hooks: H,
) where
    F: ProviderFactory + 'static,
    H: LifecycleHooks + 'static,
{
    let sender = EmailSender::new(factory)
        .with_hooks(hooks)
        .with_default_region(&config.default_region);
    registry.register(
        EMAIL_SEND_SERVICE,
        EMAIL_SEND_DESCRIPTION,
        Arc::new(EmailSendHandler::new(sender)),
    );
}

/// Registry with every operation wired to the real SES provider.
pub fn default_registry(config: &MailerConfig) -> ServiceRegistry {
    let mut registry = ServiceRegistry::new();
    register_email_send(
        &mut registry,
        config,
        SesProviderFactory::new(config.provider_config()),
        NoopHooks,
    );
    log::info!(
        "registered {} (default region {})",
        EMAIL_SEND_SERVICE,
        config.default_region
    );
    registry
}
