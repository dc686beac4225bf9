//! **mailbridge**: host surface for the Amazon SES email-send operation.
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = mailbridge::MailerConfig::from_yaml_str("default_region: eu-west-1")?;
//! mailbridge::init_logging(&config.logging)?;
//!
//! let registry = mailbridge::default_registry(&config);
//! let result = registry
//!     .dispatch(mailbridge::EMAIL_SEND_SERVICE, serde_json::json!({ "email": {} }))
//!     .await;
//! # let _ = result;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod handlers;
pub mod logging;
pub mod registry;

pub use config::{ConfigError, LoggingConfig, MailerConfig};
pub use handlers::{
    default_registry, register_email_send, EmailSendHandler, EMAIL_SEND_DESCRIPTION,
    EMAIL_SEND_SERVICE,
};
pub use logging::{init_logging, LoggingError};
pub use registry::{ServiceEntry, ServiceHandler, ServiceRegistry};

pub use mailbridge_aws as aws;
pub use mailbridge_mail as mail;
