//! Seam between the send flow and the SES client.
//!
//! A provider is built per request, because credentials and region travel
//! with each request.

use async_trait::async_trait;
use mailbridge_aws::{
    AwsCredentials, AwsRegion, AwsResult, ProviderConfig, RawEmail, SendEmailOutput, SesClient,
    SimpleEmail,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send_email(&self, email: &SimpleEmail) -> AwsResult<SendEmailOutput>;
    async fn send_raw_email(&self, raw: &RawEmail) -> AwsResult<SendEmailOutput>;
}

pub trait ProviderFactory: Send + Sync {
    fn build(&self, credentials: AwsCredentials, region: AwsRegion) -> Box<dyn EmailProvider>;
}

// ── SES ─────────────────────────────────────────────────────────────────

pub struct SesProvider {
    client: SesClient,
}

impl SesProvider {
    pub fn new(client: SesClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EmailProvider for SesProvider {
    async fn send_email(&self, email: &SimpleEmail) -> AwsResult<SendEmailOutput> {
        self.client.send_email(email).await
    }

    async fn send_raw_email(&self, raw: &RawEmail) -> AwsResult<SendEmailOutput> {
        self.client.send_raw_email(raw).await
    }
}

#[derive(Debug, Clone, Default)]
pub struct SesProviderFactory {
    config: ProviderConfig,
}

impl SesProviderFactory {
    pub fn new(config: ProviderConfig) -> Self {
        Self { config }
    }
}

impl ProviderFactory for SesProviderFactory {
    fn build(&self, credentials: AwsCredentials, region: AwsRegion) -> Box<dyn EmailProvider> {
        if !region.is_ses_region() {
            log::warn!("region {} is not a known SES region", region.name);
        }
        log::debug!("building SES provider for region {}", region.name);
        Box::new(SesProvider::new(SesClient::from_credentials(
            credentials,
            region,
            &self.config,
        )))
    }
}
