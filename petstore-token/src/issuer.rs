//! Token signing

use crate::claims::{CustomerClaims, TokenClaims};
use crate::customer::Customer;
use crate::error::TokenError;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// ES256 token issuer over a registry of known customers
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    issuer: String,
    audience: String,
    key_id: String,
    customers: BTreeMap<String, Customer>,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("key_id", &self.key_id)
            .field("customers", &self.customers)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Load the EC private key from a PEM file.
    ///
    /// Missing or unparsable keys are fatal configuration errors; the
    /// messages carry operator guidance on how to produce a valid key.
    pub fn from_pem_file(
        path: impl AsRef<Path>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
        key_id: impl Into<String>,
    ) -> Result<Self, TokenError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TokenError::KeyFileNotFound {
                path: path.to_path_buf(),
            });
        }
        let pem = std::fs::read(path)?;
        Self::from_pem(&pem, issuer, audience, key_id)
    }

    /// Build an issuer from PEM bytes already in memory
    pub fn from_pem(
        pem: &[u8],
        issuer: impl Into<String>,
        audience: impl Into<String>,
        key_id: impl Into<String>,
    ) -> Result<Self, TokenError> {
        let encoding_key =
            EncodingKey::from_ec_pem(pem).map_err(|e| Self::diagnose_key_error(pem, e))?;
        Ok(Self {
            encoding_key,
            issuer: issuer.into(),
            audience: audience.into(),
            key_id: key_id.into(),
            customers: BTreeMap::new(),
        })
    }

    /// Turn a low-level key parse failure into an actionable diagnostic
    fn diagnose_key_error(pem: &[u8], source: jsonwebtoken::errors::Error) -> TokenError {
        let text = String::from_utf8_lossy(pem);
        if text.trim_start().starts_with('{') {
            return TokenError::KeyFormat(
                "the key looks like a JSON/JWK document. Use the PEM form instead \
                 (the 'Private Key' field when generating at https://mkjwk.org/ \
                 with the 'EC' algorithm selected)"
                    .to_string(),
            );
        }
        TokenError::KeyFormat(format!(
            "{}. The private key must be a valid EC key in PEM format suitable for ES256",
            source
        ))
    }

    /// Register a customer, keyed by username
    pub fn add_customer(&mut self, customer: Customer) {
        self.customers.insert(customer.username.clone(), customer);
    }

    /// Look up a registered customer
    pub fn customer(&self, username: &str) -> Option<&Customer> {
        self.customers.get(username)
    }

    /// Generate a signed token for a registered customer.
    ///
    /// `exp` is always `iat + ttl`; expiry is enforced only by the verifier.
    pub fn generate_token(&self, username: &str, ttl: Duration) -> Result<String, TokenError> {
        let customer = self
            .customers
            .get(username)
            .ok_or_else(|| TokenError::UnknownCustomer(username.to_string()))?;
        self.sign(customer, ttl)
    }

    /// Sign a token for an arbitrary customer record
    pub fn sign(&self, customer: &Customer, ttl: Duration) -> Result<String, TokenError> {
        let iat = Utc::now().timestamp();
        let exp = iat + ttl.as_secs() as i64;

        let claims = TokenClaims {
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            sub: customer.username.clone(),
            exp,
            iat,
            username: customer.username.clone(),
            customer_type: customer.tier,
            customer: CustomerClaims::from(customer),
        };

        let mut header = Header::new(Algorithm::ES256);
        header.kid = Some(self.key_id.clone());

        debug!(username = %customer.username, tier = %customer.tier, "signing token");
        Ok(encode(&header, &claims, &self.encoding_key)?)
    }

    /// Mint one token per registered customer with staggered expirations:
    /// the first expires after `base_ttl`, each subsequent one `step` later.
    pub fn mint_staggered(
        &self,
        base_ttl: Duration,
        step: Duration,
    ) -> Result<Vec<String>, TokenError> {
        let mut tokens = Vec::with_capacity(self.customers.len());
        for (i, customer) in self.customers.values().enumerate() {
            let ttl = base_ttl + step * i as u32;
            tokens.push(self.sign(customer, ttl)?);
        }
        Ok(tokens)
    }

    /// Decode a token's claims WITHOUT verifying the signature.
    ///
    /// Demo convenience only, not a security control: a real verifier must
    /// validate the signature against the public key and check expiry.
    pub fn decode_unverified(token: &str) -> Result<TokenClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::ES256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;

        let data = decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)?;
        Ok(data.claims)
    }
}
