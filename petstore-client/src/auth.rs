//! Request credentials and user-agent rotation

/// Header carrying the static API key
pub const API_KEY_HEADER: &str = "api-key-petstore";

/// Browser user agents rotated across requests
pub const USER_AGENTS: [&str; 5] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:123.0) Gecko/20100101 Firefox/123.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/133.0.0.0 Safari/537.36",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_4 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1",
];

/// Pick a random user agent
pub fn random_user_agent() -> &'static str {
    USER_AGENTS[fastrand::usize(..USER_AGENTS.len())]
}

/// A single per-request credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// Static key sent in the `api-key-petstore` header
    ApiKey(String),
    /// JWT sent as `Authorization: Bearer ...`
    Bearer(String),
}

/// The credentials available to a client; one is chosen at random per call
#[derive(Debug, Clone, Default)]
pub struct CredentialSet {
    credentials: Vec<Credential>,
}

impl CredentialSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_key(key: impl Into<String>) -> Self {
        Self {
            credentials: vec![Credential::ApiKey(key.into())],
        }
    }

    pub fn push_bearer(&mut self, token: impl Into<String>) {
        self.credentials.push(Credential::Bearer(token.into()));
    }

    pub fn extend_bearers(&mut self, tokens: impl IntoIterator<Item = String>) {
        self.credentials
            .extend(tokens.into_iter().map(Credential::Bearer));
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    /// Uniform random pick across everything loaded
    pub fn pick(&self) -> Option<&Credential> {
        if self.credentials.is_empty() {
            return None;
        }
        Some(&self.credentials[fastrand::usize(..self.credentials.len())])
    }
}
