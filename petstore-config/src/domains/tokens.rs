//! Token issuer configuration

use crate::error::ConfigResult;
use crate::validation::{validate_positive, validate_required_string, Validatable};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Token issuer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Path to the EC private key in PEM format
    #[serde(default = "default_key_path")]
    pub key_path: PathBuf,

    /// JWT issuer claim
    #[serde(default = "default_issuer")]
    pub issuer: String,

    /// JWT audience claim
    #[serde(default = "default_audience")]
    pub audience: String,

    /// Key ID for the JWT header
    #[serde(default = "default_key_id")]
    pub key_id: String,

    /// Default token validity period
    #[serde(
        with = "crate::domains::utils::serde_duration",
        default = "default_expiration"
    )]
    pub expiration: Duration,

    /// Directory to persist issued tokens to (tokens are only printed if unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            key_path: default_key_path(),
            issuer: default_issuer(),
            audience: default_audience(),
            key_id: default_key_id(),
            expiration: default_expiration(),
            output_dir: None,
        }
    }
}

impl Validatable for TokenConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_required_string(&self.issuer, "issuer", self.domain_name())?;
        validate_required_string(&self.audience, "audience", self.domain_name())?;
        validate_required_string(&self.key_id, "key_id", self.domain_name())?;
        validate_positive(self.expiration.as_secs(), "expiration", self.domain_name())?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "tokens"
    }
}

// Default value functions
fn default_key_path() -> PathBuf {
    PathBuf::from("private-key.pem")
}

fn default_issuer() -> String {
    "https://petstore.automatic-demo.com".to_string()
}

fn default_audience() -> String {
    "petstore".to_string()
}

fn default_key_id() -> String {
    "petstore-ec256".to_string()
}

fn default_expiration() -> Duration {
    Duration::from_secs(3600)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_config_defaults() {
        let config = TokenConfig::default();
        assert_eq!(config.audience, "petstore");
        assert_eq!(config.key_id, "petstore-ec256");
        assert_eq!(config.expiration, Duration::from_secs(3600));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_token_config_rejects_empty_issuer() {
        let config = TokenConfig {
            issuer: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
