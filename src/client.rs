//! HTTP client for the account API.
//!
//! Authentication exchanges the configured key and secret for a bearer
//! token; data requests then present that token together with the
//! account header. Nothing is cached between calls.

use core::fmt;

use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::ApiError;

/// Path of the token exchange endpoint, appended to the base URL.
const AUTH_PATH: &str = "/auth/token";

/// Header carrying the account ID on every request.
const ACCOUNT_ID_HEADER: &str = "x-account-id";

/// Number of token characters shown in debug logs.
const TOKEN_PREFIX_LEN: usize = 20;

/// Bearer token returned by the authentication endpoint.
#[derive(Deserialize)]
pub(crate) struct AuthToken {
    /// Raw token string.
    #[serde(alias = "access_token")]
    token: String,
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AuthToken").field(&"<redacted>").finish()
    }
}

impl AuthToken {
    /// Extracts the token from an authentication response body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidToken`] if the body has no string
    /// `token` (or `access_token`) field.
    pub(crate) fn from_response(body: Value) -> Result<Self, ApiError> {
        serde_json::from_value(body).map_err(ApiError::InvalidToken)
    }

    /// Returns the token string.
    pub(crate) fn as_str(&self) -> &str {
        &self.token
    }

    /// Returns the leading characters of the token for log output.
    fn prefix(&self) -> String {
        self.token.chars().take(TOKEN_PREFIX_LEN).collect()
    }
}

/// Client for the account API.
#[derive(Debug)]
pub(crate) struct ApiClient {
    /// Shared connection pool.
    http: Client,
    /// Credentials, base URL and account ID.
    config: Config,
}

impl ApiClient {
    /// Creates a client for the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the HTTP client cannot be built.
    pub(crate) fn new(config: Config) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        Ok(Self { http, config })
    }

    /// Exchanges the configured credentials for a bearer token.
    ///
    /// Failures are logged and returned to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Status`] for a non-success response,
    /// [`ApiError::Http`] for transport or decoding failures, and
    /// [`ApiError::InvalidToken`] if the response has no token.
    pub(crate) async fn authenticate(&self) -> Result<AuthToken, ApiError> {
        match self.request_token().await {
            Ok(token) => {
                info!("authentication successful");
                Ok(token)
            }
            Err(err) => {
                error!(%err, "error authenticating");
                Err(err)
            }
        }
    }

    /// Sends the token exchange request.
    async fn request_token(&self) -> Result<AuthToken, ApiError> {
        let url = format!("{}{AUTH_PATH}", self.config.base_url);
        let response = self
            .http
            .post(&url)
            .header(ACCOUNT_ID_HEADER, &self.config.account_id)
            .form(&[
                ("key", self.config.api_key.as_str()),
                ("secret", self.config.api_secret.as_str()),
            ])
            .send()
            .await?;
        let body: Value = success(response)?.json().await?;
        AuthToken::from_response(body)
    }

    /// Fetches `endpoint`, returning `None` on any failure.
    ///
    /// The failure itself is only logged.
    pub(crate) async fn fetch_account_data(&self, endpoint: &str, token: &AuthToken) -> Option<Value> {
        match self.try_fetch_account_data(endpoint, token).await {
            Ok(data) => Some(data),
            Err(err) => {
                warn!(%err, endpoint, "failed to fetch account data");
                None
            }
        }
    }

    /// Fetches `endpoint` and decodes the body as JSON.
    ///
    /// `endpoint` is appended to the base URL as-is.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Status`] for a non-success response and
    /// [`ApiError::Http`] for transport or decoding failures.
    pub(crate) async fn try_fetch_account_data(
        &self,
        endpoint: &str,
        token: &AuthToken,
    ) -> Result<Value, ApiError> {
        let url = format!("{}{endpoint}", self.config.base_url);
        debug!(token_prefix = %token.prefix(), "using bearer token");
        debug!(%url, "sending account data request");

        let response = self
            .http
            .get(&url)
            .header(ACCOUNT_ID_HEADER, &self.config.account_id)
            .bearer_auth(token.as_str())
            .send()
            .await?;
        let data: Value = success(response)?.json().await?;
        Ok(data)
    }
}

/// Passes through a success response, otherwise reports its status.
fn success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ApiError::Status(status.as_u16()))
    }
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::panic,
    clippy::missing_docs_in_private_items,
    clippy::use_debug,
    reason = "test code uses expect, panic and debug formatting for readability"
)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{ApiClient, AuthToken};
    use crate::config::Config;
    use crate::error::ApiError;

    fn config(base_url: &str) -> Config {
        Config {
            base_url: base_url.to_owned(),
            account_id: "acct1".to_owned(),
            api_key: "key-1".to_owned(),
            api_secret: "secret-1".to_owned(),
            timeout: None,
        }
    }

    fn client(base_url: &str) -> ApiClient {
        ApiClient::new(config(base_url)).expect("client builds")
    }

    fn token(raw: &str) -> AuthToken {
        AuthToken::from_response(json!({ "token": raw })).expect("token parses")
    }

    #[test]
    fn token_accepts_access_token_alias() {
        let parsed = AuthToken::from_response(json!({ "access_token": "xyz" }))
            .expect("alias parses");
        assert_eq!(parsed.as_str(), "xyz");
    }

    #[test]
    fn token_without_field_is_rejected() {
        let result = AuthToken::from_response(json!({ "expires_in": 3600 }));
        assert!(matches!(result, Err(ApiError::InvalidToken(_))));
    }

    #[test]
    fn token_prefix_is_truncated() {
        let long = token("abcdefghijklmnopqrstuvwxyz");
        assert_eq!(long.prefix(), "abcdefghijklmnopqrst");
        assert_eq!(token("short").prefix(), "short");
    }

    #[test]
    fn token_debug_is_redacted() {
        assert!(!format!("{:?}", token("abc123")).contains("abc123"));
    }

    #[tokio::test]
    async fn authenticate_posts_form_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/token"))
            .and(header("x-account-id", "acct1"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string("key=key-1&secret=secret-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "abc123" })))
            .expect(1)
            .mount(&server)
            .await;

        let token = client(&server.uri())
            .authenticate()
            .await
            .expect("authentication succeeds");
        assert_eq!(token.as_str(), "abc123");
    }

    #[tokio::test]
    async fn authenticate_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/token"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        match client(&server.uri()).authenticate().await {
            Err(ApiError::Status(status)) => assert_eq!(status, 401),
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn authenticate_rejects_response_without_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .mount(&server)
            .await;

        let result = client(&server.uri()).authenticate().await;
        assert!(matches!(result, Err(ApiError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn authenticate_rejects_malformed_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let result = client(&server.uri()).authenticate().await;
        assert!(matches!(result, Err(ApiError::Http(_))));
    }

    #[tokio::test]
    async fn authenticate_reports_network_failure() {
        let result = client("http://127.0.0.1:1").authenticate().await;
        assert!(matches!(result, Err(ApiError::Http(_))));
    }

    #[tokio::test]
    async fn fetch_sends_bearer_and_account_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/accounts"))
            .and(header("x-account-id", "acct1"))
            .and(header("authorization", "Bearer abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "acct1" })))
            .expect(1)
            .mount(&server)
            .await;

        let data = client(&server.uri())
            .fetch_account_data("/accounts", &token("abc123"))
            .await;
        assert_eq!(data, Some(json!({ "id": "acct1" })));
    }

    #[tokio::test]
    async fn fetch_keeps_empty_object() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/accounts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let data = client(&server.uri())
            .fetch_account_data("/accounts", &token("abc123"))
            .await;
        assert_eq!(data, Some(json!({})));
    }

    #[tokio::test]
    async fn fetch_is_soft_on_status_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/accounts"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let api = client(&server.uri());
        assert_eq!(api.fetch_account_data("/accounts", &token("abc123")).await, None);
        match api.try_fetch_account_data("/accounts", &token("abc123")).await {
            Err(ApiError::Status(status)) => assert_eq!(status, 500),
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fetch_is_soft_on_network_failure() {
        let data = client("http://127.0.0.1:1")
            .fetch_account_data("/accounts", &token("abc123"))
            .await;
        assert_eq!(data, None);
    }
}
