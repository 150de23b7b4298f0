//! JWT token issuer for synthetic petstore customers
//!
//! Builds ES256-signed tokens carrying a customer claim set: standard
//! registered claims plus the username and tier denormalized at the top
//! level and the full customer record nested under `customer`.

pub mod claims;
pub mod customer;
pub mod error;
pub mod issuer;
pub mod store;

pub use claims::{CustomerClaims, TokenClaims};
pub use customer::{example_customers, Customer, CustomerTier};
pub use error::TokenError;
pub use issuer::TokenIssuer;
pub use store::{load_tokens, save_token};
