//! Configuration loading and environment variable handling

use crate::domains::PetstoreConfig;
use crate::error::{ConfigError, ConfigResult};
use std::path::Path;

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    /// Environment variable prefix
    prefix: String,
}

impl ConfigLoader {
    /// Create a new config loader with default prefix
    pub fn new() -> Self {
        Self {
            prefix: "PETSTORE".to_string(),
        }
    }

    /// Create a new config loader with custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Load configuration from a YAML file with environment overrides
    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<PetstoreConfig> {
        let content = std::fs::read_to_string(path)?;
        let mut config: PetstoreConfig = serde_yaml::from_str(&content)?;

        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env(&self) -> ConfigResult<PetstoreConfig> {
        let mut config = PetstoreConfig::default();
        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load configuration with fallback chain
    pub fn load(&self, config_path: Option<impl AsRef<Path>>) -> ConfigResult<PetstoreConfig> {
        match config_path {
            Some(path) => self.from_file(path),
            None => self.from_env(),
        }
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(&self, config: &mut PetstoreConfig) -> ConfigResult<()> {
        self.apply_http_overrides(&mut config.http)?;
        self.apply_simulation_overrides(&mut config.simulation)?;
        self.apply_token_overrides(&mut config.tokens)?;
        self.apply_logging_overrides(&mut config.logging)?;
        Ok(())
    }

    /// Apply HTTP config overrides
    fn apply_http_overrides(
        &self,
        config: &mut crate::domains::http::HttpConfig,
    ) -> ConfigResult<()> {
        if let Ok(timeout) = self.get_env_var("HTTP_TIMEOUT") {
            let seconds: u64 = timeout
                .parse()
                .map_err(|e| ConfigError::EnvError(format!("Invalid HTTP_TIMEOUT: {}", e)))?;
            config.timeout = std::time::Duration::from_secs(seconds);
        }

        if let Ok(verify_ssl) = self.get_env_var("HTTP_VERIFY_SSL") {
            config.verify_ssl = verify_ssl
                .parse()
                .map_err(|e| ConfigError::EnvError(format!("Invalid HTTP_VERIFY_SSL: {}", e)))?;
        }

        Ok(())
    }

    /// Apply simulation config overrides
    fn apply_simulation_overrides(
        &self,
        config: &mut crate::domains::simulation::SimulationConfig,
    ) -> ConfigResult<()> {
        if let Ok(base_url) = self.get_env_var("BASE_URL") {
            config.base_url = base_url;
        }

        if let Ok(api_key) = self.get_env_var("API_KEY") {
            config.api_key = Some(api_key);
        }

        if let Ok(parallel) = self.get_env_var("PARALLEL") {
            config.parallel = parallel
                .parse()
                .map_err(|e| ConfigError::EnvError(format!("Invalid PARALLEL: {}", e)))?;
        }

        Ok(())
    }

    /// Apply token issuer config overrides
    fn apply_token_overrides(
        &self,
        config: &mut crate::domains::tokens::TokenConfig,
    ) -> ConfigResult<()> {
        if let Ok(key_path) = self.get_env_var("KEY_PATH") {
            config.key_path = key_path.into();
        }

        if let Ok(issuer) = self.get_env_var("ISSUER") {
            config.issuer = issuer;
        }

        if let Ok(audience) = self.get_env_var("AUDIENCE") {
            config.audience = audience;
        }

        if let Ok(key_id) = self.get_env_var("KEY_ID") {
            config.key_id = key_id;
        }

        Ok(())
    }

    /// Apply logging config overrides
    fn apply_logging_overrides(
        &self,
        config: &mut crate::domains::logging::LoggingConfig,
    ) -> ConfigResult<()> {
        if let Ok(log_level) = self.get_env_var("LOG_LEVEL") {
            use std::str::FromStr;
            config.level = crate::domains::logging::LogLevel::from_str(&log_level)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_LEVEL: {}", log_level)))?;
        }

        Ok(())
    }

    /// Get environment variable with prefix
    fn get_env_var(&self, name: &str) -> Result<String, std::env::VarError> {
        std::env::var(format!("{}_{}", self.prefix, name))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_from_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "simulation:\n  base_url: http://petstore.test:9090\n  min_pets: 20\nhttp:\n  timeout: 5"
        )
        .unwrap();

        let config = ConfigLoader::new().from_file(file.path()).unwrap();
        assert_eq!(config.simulation.base_url, "http://petstore.test:9090");
        assert_eq!(config.simulation.min_pets, 20);
        assert_eq!(config.http.timeout, std::time::Duration::from_secs(5));
        // Unset fields keep their defaults
        assert_eq!(config.simulation.min_users, 5);
    }

    #[test]
    fn test_env_override_applies() {
        // Unique prefix so parallel tests don't interfere
        std::env::set_var("PTLOADER_BASE_URL", "http://override.test");
        let config = ConfigLoader::with_prefix("PTLOADER").from_env().unwrap();
        assert_eq!(config.simulation.base_url, "http://override.test");
        std::env::remove_var("PTLOADER_BASE_URL");
    }

    #[test]
    fn test_invalid_file_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "simulation:\n  base_url: ':::not a url'").unwrap();
        assert!(ConfigLoader::new().from_file(file.path()).is_err());
    }
}
