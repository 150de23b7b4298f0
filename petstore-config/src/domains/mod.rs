//! Domain-specific configuration modules

pub mod http;
pub mod logging;
pub mod simulation;
pub mod tokens;
pub mod utils;

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};

/// Main configuration combining all domains
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PetstoreConfig {
    /// HTTP client configuration
    #[serde(default)]
    pub http: http::HttpConfig,

    /// Traffic simulation configuration
    #[serde(default)]
    pub simulation: simulation::SimulationConfig,

    /// Token issuer configuration
    #[serde(default)]
    pub tokens: tokens::TokenConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: logging::LoggingConfig,
}

impl PetstoreConfig {
    /// Validate all domain configurations
    pub fn validate_all(&self) -> ConfigResult<()> {
        self.http.validate()?;
        self.simulation.validate()?;
        self.tokens.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Generate a sample configuration file
    pub fn generate_sample() -> String {
        let config = PetstoreConfig::default();
        serde_yaml::to_string(&config)
            .unwrap_or_else(|_| "# Failed to generate sample config".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = PetstoreConfig::default();
        assert!(config.validate_all().is_ok());
    }

    #[test]
    fn test_sample_round_trips() {
        let sample = PetstoreConfig::generate_sample();
        let parsed: PetstoreConfig = serde_yaml::from_str(&sample).unwrap();
        assert!(parsed.validate_all().is_ok());
    }
}
