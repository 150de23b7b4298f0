//! Traffic simulation configuration

use crate::error::ConfigResult;
use crate::validation::{validate_positive, validate_url, Validatable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Traffic simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Base URL of the petstore API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Static API key credential (may also come from PETSTORE_API_KEY)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Total simulation duration
    #[serde(
        with = "crate::domains::utils::serde_duration",
        default = "default_duration"
    )]
    pub duration: Duration,

    /// Approximate operations per minute per worker
    #[serde(default = "default_operations_per_minute")]
    pub operations_per_minute: u32,

    /// Minimum number of pets to maintain
    #[serde(default = "default_min_pets")]
    pub min_pets: usize,

    /// Minimum number of users to maintain
    #[serde(default = "default_min_users")]
    pub min_users: usize,

    /// Minimum number of orders to maintain
    #[serde(default = "default_min_orders")]
    pub min_orders: usize,

    /// Number of concurrent workers (0 = sequential)
    #[serde(default)]
    pub parallel: usize,

    /// Entity ids 1..=N are seed data and never deleted
    #[serde(default = "default_protected_ceiling")]
    pub protected_ceiling: u64,

    /// How often the supervisor re-enforces minimums in parallel mode
    #[serde(
        with = "crate::domains::utils::serde_duration",
        default = "default_maintenance_interval"
    )]
    pub maintenance_interval: Duration,

    /// Re-enforce minimums every N operations in sequential mode
    #[serde(default = "default_maintenance_every_ops")]
    pub maintenance_every_ops: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            duration: default_duration(),
            operations_per_minute: default_operations_per_minute(),
            min_pets: default_min_pets(),
            min_users: default_min_users(),
            min_orders: default_min_orders(),
            parallel: 0,
            protected_ceiling: default_protected_ceiling(),
            maintenance_interval: default_maintenance_interval(),
            maintenance_every_ops: default_maintenance_every_ops(),
        }
    }
}

impl Validatable for SimulationConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_url(&self.base_url, "base_url", self.domain_name())?;
        validate_positive(self.duration.as_secs(), "duration", self.domain_name())?;
        validate_positive(
            self.operations_per_minute,
            "operations_per_minute",
            self.domain_name(),
        )?;
        validate_positive(
            self.maintenance_interval.as_secs(),
            "maintenance_interval",
            self.domain_name(),
        )?;
        validate_positive(
            self.maintenance_every_ops,
            "maintenance_every_ops",
            self.domain_name(),
        )?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "simulation"
    }
}

// Default value functions
fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_duration() -> Duration {
    Duration::from_secs(10 * 60)
}

fn default_operations_per_minute() -> u32 {
    30
}

fn default_min_pets() -> usize {
    10
}

fn default_min_users() -> usize {
    5
}

fn default_min_orders() -> usize {
    3
}

fn default_protected_ceiling() -> u64 {
    5
}

fn default_maintenance_interval() -> Duration {
    Duration::from_secs(10)
}

fn default_maintenance_every_ops() -> u64 {
    50
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulation_config_defaults() {
        let config = SimulationConfig::default();
        assert_eq!(config.min_pets, 10);
        assert_eq!(config.min_users, 5);
        assert_eq!(config.min_orders, 3);
        assert_eq!(config.parallel, 0);
        assert_eq!(config.protected_ceiling, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_simulation_config_rejects_bad_url() {
        let config = SimulationConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_simulation_config_rejects_zero_rate() {
        let config = SimulationConfig {
            operations_per_minute: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
