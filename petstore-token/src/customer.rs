//! Customer model

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Customer tier classification carried in issued tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerTier {
    Free,
    Standard,
    Premium,
}

impl CustomerTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerTier::Free => "free",
            CustomerTier::Standard => "standard",
            CustomerTier::Premium => "premium",
        }
    }

    /// All supported tiers
    pub fn all() -> &'static [CustomerTier] {
        &[
            CustomerTier::Free,
            CustomerTier::Standard,
            CustomerTier::Premium,
        ]
    }
}

impl fmt::Display for CustomerTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CustomerTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "free" => Ok(CustomerTier::Free),
            "standard" => Ok(CustomerTier::Standard),
            "premium" => Ok(CustomerTier::Premium),
            _ => Err(format!(
                "Invalid customer tier: '{}'. Valid tiers are: free, standard, premium",
                s
            )),
        }
    }
}

/// A synthetic customer identity. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct Customer {
    pub username: String,
    pub tier: CustomerTier,
    pub email: String,
    pub company: Option<String>,
    pub subscription_tier: Option<String>,
    pub additional_metadata: Map<String, Value>,
}

impl Customer {
    pub fn new(
        username: impl Into<String>,
        tier: CustomerTier,
        email: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            tier,
            email: email.into(),
            company: None,
            subscription_tier: None,
            additional_metadata: Map::new(),
        }
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    pub fn with_subscription_tier(mut self, subscription_tier: impl Into<String>) -> Self {
        self.subscription_tier = Some(subscription_tier.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.additional_metadata = metadata;
        self
    }
}

/// Built-in example customers used when no customer is given on the CLI
pub fn example_customers() -> Vec<Customer> {
    vec![
        Customer::new("user1", CustomerTier::Premium, "user1@example.com")
            .with_company("Acme Corp")
            .with_subscription_tier("enterprise")
            .with_metadata(metadata(1000, "full")),
        Customer::new("user2", CustomerTier::Standard, "user2@example.com")
            .with_company("Beta Inc")
            .with_subscription_tier("professional")
            .with_metadata(metadata(500, "standard")),
        Customer::new("user3", CustomerTier::Free, "user3@example.com")
            .with_metadata(metadata(100, "basic")),
    ]
}

fn metadata(rate_limit: u64, access_level: &str) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("rate_limit".to_string(), rate_limit.into());
    map.insert("api_access_level".to_string(), access_level.into());
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_from_str() {
        assert_eq!("free".parse::<CustomerTier>().unwrap(), CustomerTier::Free);
        assert_eq!(
            "PREMIUM".parse::<CustomerTier>().unwrap(),
            CustomerTier::Premium
        );
        assert!("platinum".parse::<CustomerTier>().is_err());
    }

    #[test]
    fn test_tier_round_trip() {
        for tier in CustomerTier::all() {
            assert_eq!(tier.as_str().parse::<CustomerTier>().unwrap(), *tier);
        }
    }

    #[test]
    fn test_builder() {
        let customer = Customer::new("alice", CustomerTier::Premium, "alice@example.com")
            .with_company("Initech")
            .with_subscription_tier("enterprise");
        assert_eq!(customer.username, "alice");
        assert_eq!(customer.company.as_deref(), Some("Initech"));
        assert!(customer.additional_metadata.is_empty());
    }

    #[test]
    fn test_example_customers() {
        let customers = example_customers();
        assert_eq!(customers.len(), 3);
        assert_eq!(customers[0].tier, CustomerTier::Premium);
        assert_eq!(customers[2].tier, CustomerTier::Free);
    }
}
