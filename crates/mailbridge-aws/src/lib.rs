//! # mailbridge-aws – Amazon SES over the Query protocol
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │  SesClient  (ses.rs)                             │
//! │  ├── send_email      (Action=SendEmail)          │
//! │  └── send_raw_email  (Action=SendRawEmail)       │
//! ├──────────────────────────────────────────────────┤
//! │  AwsClient  (client.rs)                          │
//! │  └── query_request  (form body, XML response)    │
//! ├──────────────────────────────────────────────────┤
//! │  SigV4Signer  (signing.rs)                       │
//! │  └── hmac-sha256 / canonical request / signing   │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! Every call is a single signed HTTPS POST. There is no retry layer.

pub mod error;
pub mod config;
pub mod signing;
pub mod client;
pub mod ses;

pub use config::{AwsCredentials, AwsRegion, ProviderConfig};
pub use error::{AwsError, AwsResult};
pub use ses::{Destination, RawEmail, SendEmailOutput, SesClient, SimpleEmail};
