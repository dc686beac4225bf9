//! Host configuration.
//!
//! Every field has a default, so an empty document is a valid config.
//!
//! ```yaml
//! default_region: eu-west-1
//! endpoint_url: http://localhost:4566   # LocalStack
//! request_timeout_secs: 30
//! logging:
//!   filter: "mailbridge=debug,info"
//!   json: true
//! ```

use std::path::Path;

use mailbridge_aws::ProviderConfig;
use mailbridge_mail::DEFAULT_REGION;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailerConfig {
    /// Region used when a request's vendor block names none.
    pub default_region: String,
    /// Replaces `https://email.<region>.amazonaws.com` when set.
    pub endpoint_url: Option<String>,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub user_agent: String,
    pub logging: LoggingConfig,
}

impl Default for MailerConfig {
    fn default() -> Self {
        let provider = ProviderConfig::default();
        Self {
            default_region: DEFAULT_REGION.to_string(),
            endpoint_url: provider.endpoint_url,
            request_timeout_secs: provider.request_timeout_secs,
            connect_timeout_secs: provider.connect_timeout_secs,
            user_agent: provider.user_agent,
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives. `RUST_LOG` wins when set.
    pub filter: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: cfg!(feature = "logs-json"),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Yaml(serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config read error: {}", e),
            ConfigError::Json(e) => write!(f, "config JSON error: {}", e),
            ConfigError::Yaml(e) => write!(f, "config YAML error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        ConfigError::Yaml(e)
    }
}

impl MailerConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Load from a file; `.json` is parsed as JSON, anything else as YAML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text),
            _ => Self::from_yaml_str(&text),
        }
    }

    /// HTTP settings handed to every provider client.
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            endpoint_url: self.endpoint_url.clone(),
            request_timeout_secs: self.request_timeout_secs,
            connect_timeout_secs: self.connect_timeout_secs,
            user_agent: self.user_agent.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let cfg = MailerConfig::default();
        assert_eq!(cfg.default_region, "ap-south-1");
        assert_eq!(cfg.endpoint_url, None);
        assert_eq!(cfg.request_timeout_secs, 30);
        assert_eq!(cfg.connect_timeout_secs, 10);
        assert!(cfg.user_agent.starts_with("mailbridge/"));
        assert_eq!(cfg.logging.filter, "info");
    }

    #[test]
    fn empty_documents_give_defaults() {
        assert_eq!(MailerConfig::from_json_str("{}").unwrap(), MailerConfig::default());
        assert_eq!(MailerConfig::from_yaml_str("{}").unwrap(), MailerConfig::default());
    }

    #[test]
    fn partial_yaml_overrides() {
        let cfg = MailerConfig::from_yaml_str(
            "default_region: eu-west-1\nendpoint_url: http://localhost:4566\nlogging:\n  json: true\n",
        )
        .unwrap();
        assert_eq!(cfg.default_region, "eu-west-1");
        assert!(cfg.logging.json);
        assert_eq!(cfg.logging.filter, "info");

        let provider = cfg.provider_config();
        assert_eq!(provider.endpoint_url.as_deref(), Some("http://localhost:4566"));
        assert_eq!(provider.request_timeout_secs, 30);
    }

    #[test]
    fn load_picks_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("mailer.json");
        std::fs::File::create(&json_path)
            .unwrap()
            .write_all(br#"{"connect_timeout_secs": 3}"#)
            .unwrap();
        assert_eq!(MailerConfig::load(&json_path).unwrap().connect_timeout_secs, 3);

        let yaml_path = dir.path().join("mailer.yaml");
        std::fs::write(&yaml_path, "request_timeout_secs: 5\n").unwrap();
        assert_eq!(MailerConfig::load(&yaml_path).unwrap().request_timeout_secs, 5);
    }

    #[test]
    fn bad_input_is_an_error() {
        assert!(matches!(
            MailerConfig::from_json_str("{\"request_timeout_secs\": \"soon\"}"),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            MailerConfig::load(Path::new("/nonexistent/mailer.yaml")),
            Err(ConfigError::Io(_))
        ));
    }
}
