//! Petstore API client

use crate::auth::{random_user_agent, Credential, CredentialSet, API_KEY_HEADER};
use crate::errors::ClientError;
use crate::models::{Order, Pet, PetStatus, User, UserUpdate};
use crate::outcome::Outcome;
use petstore_config::HttpConfig;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

/// Observer notified after every request, successful or not.
///
/// This is the seam the simulator uses to keep its in-memory metrics
/// current at the point of each operation.
pub trait RequestObserver: Send + Sync {
    fn record(&self, endpoint: &'static str, status: Option<u16>, success: bool, duration: Duration);
}

/// Client for the petstore REST API.
///
/// One instance holds one connection pool; it is cheap to share behind an
/// `Arc` across workers.
pub struct PetstoreClient {
    base_url: String,
    http: Client,
    credentials: CredentialSet,
    observer: Option<Arc<dyn RequestObserver>>,
}

impl PetstoreClient {
    pub fn new(
        base_url: impl Into<String>,
        config: &HttpConfig,
        credentials: CredentialSet,
    ) -> Result<Self, ClientError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ClientError::InvalidBaseUrl(base_url));
        }

        debug!(timeout_secs = config.timeout.as_secs(), "creating petstore client");
        let http = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.verify_ssl)
            .redirect(reqwest::redirect::Policy::limited(
                config.max_redirects as usize,
            ))
            .build()?;

        Ok(Self {
            base_url,
            http,
            credentials,
            observer: None,
        })
    }

    /// Attach a request observer
    pub fn with_observer(mut self, observer: Arc<dyn RequestObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue one request and classify its outcome.
    ///
    /// `label` is the stable endpoint name used for metrics; `path` is the
    /// concrete path with ids substituted.
    async fn send<T, B>(
        &self,
        method: Method,
        label: &'static str,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Outcome<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let start = Instant::now();

        let mut request = self
            .http
            .request(method.clone(), &url)
            .header("User-Agent", random_user_agent())
            .header("Accept", "application/json");

        match self.credentials.pick() {
            Some(Credential::ApiKey(key)) => {
                request = request.header(API_KEY_HEADER, key);
            }
            Some(Credential::Bearer(token)) => {
                request = request.header("Authorization", format!("Bearer {}", token));
            }
            None => {}
        }

        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!("{} {}", method, url);
        let outcome = match request.send().await {
            Ok(response) => {
                let status = response.status();
                debug!("{} {} - status: {}", method, url, status.as_u16());

                if status.as_u16() == 404 {
                    warn!("{} {} returned 404", method, url);
                    Outcome::NotFound
                } else if status.is_success() {
                    // DELETE success arrives as 200 or 204, both land here
                    let body = match response.bytes().await {
                        Ok(bytes) if !bytes.is_empty() => {
                            match serde_json::from_slice::<T>(&bytes) {
                                Ok(parsed) => Some(parsed),
                                Err(e) => {
                                    warn!("{} {} - unparsable response body: {}", method, url, e);
                                    None
                                }
                            }
                        }
                        _ => None,
                    };
                    Outcome::Success {
                        status: status.as_u16(),
                        body,
                    }
                } else {
                    let text = response.text().await.unwrap_or_default();
                    error!(
                        "HTTP error {}: {} {} - Response: {}",
                        status.as_u16(),
                        method,
                        url,
                        if text.is_empty() { "No response body" } else { &text }
                    );
                    Outcome::Failed {
                        status: status.as_u16(),
                    }
                }
            }
            Err(e) if e.is_timeout() => {
                error!("Request timeout: {} {}", method, url);
                Outcome::NoResponse
            }
            Err(e) if e.is_connect() => {
                error!("Connection error: {} {}", method, url);
                Outcome::NoResponse
            }
            Err(e) => {
                error!("Unexpected error: {} {} - {}", method, url, e);
                Outcome::NoResponse
            }
        };

        if let Some(observer) = &self.observer {
            observer.record(label, outcome.status(), outcome.is_success(), start.elapsed());
        }
        outcome
    }

    // Pet operations

    pub async fn create_pet(&self, pet: &Pet) -> Outcome<Pet> {
        self.send(Method::POST, "/pet", "/pet", &[], Some(pet)).await
    }

    pub async fn update_pet(&self, pet: &Pet) -> Outcome<Pet> {
        self.send(Method::PUT, "/pet", "/pet", &[], Some(pet)).await
    }

    pub async fn get_pet(&self, pet_id: i64) -> Outcome<Pet> {
        self.send(
            Method::GET,
            "/pet/{id}",
            &format!("/pet/{}", pet_id),
            &[],
            None::<&()>,
        )
        .await
    }

    pub async fn delete_pet(&self, pet_id: i64) -> Outcome<JsonValue> {
        self.send(
            Method::DELETE,
            "/pet/{id}",
            &format!("/pet/{}", pet_id),
            &[],
            None::<&()>,
        )
        .await
    }

    pub async fn find_pets_by_status(&self, status: PetStatus) -> Outcome<Vec<Pet>> {
        self.send(
            Method::GET,
            "/pet/findByStatus",
            "/pet/findByStatus",
            &[("status", status.as_str().to_string())],
            None::<&()>,
        )
        .await
    }

    pub async fn find_pets_by_tags(&self, tags: &[String]) -> Outcome<Vec<Pet>> {
        let query: Vec<(&str, String)> = tags.iter().map(|t| ("tags", t.clone())).collect();
        self.send(
            Method::GET,
            "/pet/findByTags",
            "/pet/findByTags",
            &query,
            None::<&()>,
        )
        .await
    }

    // User operations

    pub async fn create_user(&self, user: &User) -> Outcome<JsonValue> {
        self.send(Method::POST, "/user", "/user", &[], Some(user))
            .await
    }

    pub async fn update_user(&self, username: &str, update: &UserUpdate) -> Outcome<JsonValue> {
        self.send(
            Method::PUT,
            "/user/{username}",
            &format!("/user/{}", username),
            &[],
            Some(update),
        )
        .await
    }

    pub async fn get_user(&self, username: &str) -> Outcome<User> {
        self.send(
            Method::GET,
            "/user/{username}",
            &format!("/user/{}", username),
            &[],
            None::<&()>,
        )
        .await
    }

    pub async fn delete_user(&self, username: &str) -> Outcome<JsonValue> {
        self.send(
            Method::DELETE,
            "/user/{username}",
            &format!("/user/{}", username),
            &[],
            None::<&()>,
        )
        .await
    }

    pub async fn login(&self, username: &str, password: &str) -> Outcome<JsonValue> {
        self.send(
            Method::GET,
            "/user/login",
            "/user/login",
            &[
                ("username", username.to_string()),
                ("password", password.to_string()),
            ],
            None::<&()>,
        )
        .await
    }

    pub async fn logout(&self) -> Outcome<JsonValue> {
        self.send(
            Method::GET,
            "/user/logout",
            "/user/logout",
            &[],
            None::<&()>,
        )
        .await
    }

    // Store operations

    pub async fn create_order(&self, order: &Order) -> Outcome<Order> {
        self.send(Method::POST, "/store/order", "/store/order", &[], Some(order))
            .await
    }

    pub async fn get_order(&self, order_id: i64) -> Outcome<Order> {
        self.send(
            Method::GET,
            "/store/order/{id}",
            &format!("/store/order/{}", order_id),
            &[],
            None::<&()>,
        )
        .await
    }

    pub async fn delete_order(&self, order_id: i64) -> Outcome<JsonValue> {
        self.send(
            Method::DELETE,
            "/store/order/{id}",
            &format!("/store/order/{}", order_id),
            &[],
            None::<&()>,
        )
        .await
    }

    /// Pet counts keyed by status
    pub async fn inventory(&self) -> Outcome<JsonValue> {
        self.send(
            Method::GET,
            "/store/inventory",
            "/store/inventory",
            &[],
            None::<&()>,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str, credentials: CredentialSet) -> PetstoreClient {
        PetstoreClient::new(base_url, &HttpConfig::default(), credentials).unwrap()
    }

    #[tokio::test]
    async fn test_create_pet_parses_assigned_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/pet"))
            .and(header(API_KEY_HEADER, "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 42, "name": "Buddy", "photoUrls": []
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), CredentialSet::with_api_key("test-key"));
        let pet = Pet {
            id: None,
            name: "Buddy".to_string(),
            photo_urls: vec![],
            category: None,
            tags: vec![],
            status: Some(PetStatus::Available),
        };

        let outcome = client.create_pet(&pet).await;
        assert!(outcome.is_success());
        assert_eq!(outcome.into_body().unwrap().id, Some(42));
    }

    #[tokio::test]
    async fn test_missing_pet_classified_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pet/99"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), CredentialSet::new());
        assert!(client.get_pet(99).await.is_not_found());
    }

    #[tokio::test]
    async fn test_server_error_classified_failed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/store/inventory"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), CredentialSet::new());
        let outcome = client.inventory().await;
        assert!(matches!(outcome, Outcome::Failed { status: 500 }));
    }

    #[tokio::test]
    async fn test_delete_no_content_is_success() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/pet/7"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), CredentialSet::new());
        let outcome = client.delete_pet(7).await;
        assert!(outcome.is_success());
        assert_eq!(outcome.status(), Some(204));
    }

    #[tokio::test]
    async fn test_connection_failure_is_no_response() {
        // Port 1 is never listening
        let client = test_client("http://127.0.0.1:1", CredentialSet::new());
        let outcome = client.logout().await;
        assert!(matches!(outcome, Outcome::NoResponse));
    }

    #[tokio::test]
    async fn test_bearer_credential_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user/login"))
            .and(query_param("username", "user1"))
            .and(header("Authorization", "Bearer tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!("ok")))
            .mount(&server)
            .await;

        let mut credentials = CredentialSet::new();
        credentials.push_bearer("tok-1");
        let client = test_client(&server.uri(), credentials);

        assert!(client.login("user1", "password123").await.is_success());
    }

    struct Recording(Mutex<Vec<(&'static str, Option<u16>, bool)>>);

    impl RequestObserver for Recording {
        fn record(
            &self,
            endpoint: &'static str,
            status: Option<u16>,
            success: bool,
            _duration: Duration,
        ) {
            self.0.lock().unwrap().push((endpoint, status, success));
        }
    }

    #[tokio::test]
    async fn test_observer_sees_every_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pet/1"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let observer = Arc::new(Recording(Mutex::new(Vec::new())));
        let client = test_client(&server.uri(), CredentialSet::new())
            .with_observer(observer.clone());

        let _ = client.get_pet(1).await;

        let seen = observer.0.lock().unwrap();
        assert_eq!(seen.as_slice(), &[("/pet/{id}", Some(404), false)]);
    }
}
