//! JWT claim structures

use crate::customer::{Customer, CustomerTier};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The full customer record nested under the `customer` key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerClaims {
    pub username: String,
    pub customer_type: CustomerTier,
    pub email: String,
    pub company: Option<String>,
    pub subscription_tier: Option<String>,
    #[serde(flatten)]
    pub additional_metadata: Map<String, Value>,
}

impl From<&Customer> for CustomerClaims {
    fn from(customer: &Customer) -> Self {
        Self {
            username: customer.username.clone(),
            customer_type: customer.tier,
            email: customer.email.clone(),
            company: customer.company.clone(),
            subscription_tier: customer.subscription_tier.clone(),
            additional_metadata: customer.additional_metadata.clone(),
        }
    }
}

/// Signed token payload: standard registered claims plus denormalized
/// customer claims (username and tier at top level for convenience).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub iss: String,
    pub aud: String,
    pub sub: String,
    /// Expiration time (unix seconds)
    pub exp: i64,
    /// Issued at (unix seconds)
    pub iat: i64,
    pub username: String,
    pub customer_type: CustomerTier,
    pub customer: CustomerClaims,
}
