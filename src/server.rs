//! MCP server exposing the account API as a single tool.
//!
//! Uses `rmcp` macros to register `get-account-data`.

extern crate alloc;

use alloc::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;
use rmcp::model::{CallToolResult, ServerCapabilities, ServerInfo};
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};

use crate::client::ApiClient;
use crate::response::ToolOutcome;

/// Endpoint fetched by `get-account-data`.
const ACCOUNTS_ENDPOINT: &str = "/accounts";

/// MCP server wrapping the account API.
#[derive(Clone)]
pub(crate) struct AccountDataServer {
    /// API client (shared via Arc).
    client: Arc<ApiClient>,
    /// Tool router for dispatching MCP tool calls.
    tool_router: ToolRouter<Self>,
}

impl core::fmt::Debug for AccountDataServer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AccountDataServer").finish_non_exhaustive()
    }
}

#[tool_router]
impl AccountDataServer {
    /// Creates a new MCP server around the given API client.
    pub(crate) fn new(client: ApiClient) -> Self {
        Self {
            client: Arc::new(client),
            tool_router: Self::tool_router(),
        }
    }

    /// Authenticates, then fetches `endpoint` with the fresh token.
    async fn account_data(&self, endpoint: &str) -> ToolOutcome {
        let token = match self.client.authenticate().await {
            Ok(token) => token,
            Err(err) => return ToolOutcome::AuthenticationFailed(err),
        };
        match self.client.fetch_account_data(endpoint, &token).await {
            Some(payload) => ToolOutcome::Data {
                endpoint: endpoint.to_owned(),
                payload,
            },
            None => ToolOutcome::RetrievalFailed {
                endpoint: endpoint.to_owned(),
            },
        }
    }

    /// Returns the account data for the configured account.
    #[tool(
        name = "get-account-data",
        description = "Get account data from the account API"
    )]
    async fn get_account_data(&self) -> Result<CallToolResult, McpError> {
        Ok(self
            .account_data(ACCOUNTS_ENDPOINT)
            .await
            .into_call_tool_result())
    }
}

#[tool_handler]
impl ServerHandler for AccountDataServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Account data MCP server. \
                 Call get-account-data to fetch the configured account from the API."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::missing_docs_in_private_items,
    reason = "test code uses expect for readability"
)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::{ACCOUNTS_ENDPOINT, AccountDataServer};
    use crate::client::ApiClient;
    use crate::config::Config;

    fn server(base_url: &str) -> AccountDataServer {
        let config = Config {
            base_url: base_url.to_owned(),
            account_id: "acct1".to_owned(),
            api_key: "key-1".to_owned(),
            api_secret: "secret-1".to_owned(),
            timeout: None,
        };
        AccountDataServer::new(ApiClient::new(config).expect("client builds"))
    }

    async fn mount_auth(mock: &MockServer, template: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path("/auth/token"))
            .respond_with(template)
            .mount(mock)
            .await;
    }

    #[tokio::test]
    async fn returns_pretty_account_data() {
        let mock = MockServer::start().await;
        mount_auth(
            &mock,
            ResponseTemplate::new(200).set_body_json(json!({ "token": "abc123" })),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/accounts"))
            .and(header("authorization", "Bearer abc123"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "id": "acct1", "balance": 42 })),
            )
            .mount(&mock)
            .await;

        let outcome = server(&mock.uri()).account_data(ACCOUNTS_ENDPOINT).await;
        assert_eq!(
            outcome.into_text(),
            "Data from /accounts:\n\n{\n  \"id\": \"acct1\",\n  \"balance\": 42\n}"
        );
    }

    #[tokio::test]
    async fn tool_call_succeeds() {
        let mock = MockServer::start().await;
        mount_auth(
            &mock,
            ResponseTemplate::new(200).set_body_json(json!({ "token": "abc123" })),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/accounts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&mock)
            .await;

        let result = server(&mock.uri())
            .get_account_data()
            .await
            .expect("tool call returns a result");
        assert_ne!(result.is_error, Some(true));
        assert_eq!(result.content.len(), 1);
    }

    #[tokio::test]
    async fn null_body_counts_as_data() {
        let mock = MockServer::start().await;
        mount_auth(
            &mock,
            ResponseTemplate::new(200).set_body_json(json!({ "token": "abc123" })),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/accounts"))
            .respond_with(ResponseTemplate::new(200).set_body_string("null"))
            .mount(&mock)
            .await;

        let api = server(&mock.uri());
        let outcome = api.account_data(ACCOUNTS_ENDPOINT).await;
        assert_eq!(outcome.into_text(), "Data from /accounts:\n\nnull");
        let result = api
            .get_account_data()
            .await
            .expect("tool call returns a result");
        assert_ne!(result.is_error, Some(true));
    }

    #[tokio::test]
    async fn authentication_failure_skips_fetch() {
        for status in [401, 500] {
            let mock = MockServer::start().await;
            mount_auth(&mock, ResponseTemplate::new(status)).await;
            Mock::given(method("GET"))
                .and(path("/accounts"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
                .expect(0)
                .mount(&mock)
                .await;

            let outcome = server(&mock.uri()).account_data(ACCOUNTS_ENDPOINT).await;
            assert_eq!(
                outcome.into_text(),
                format!("Error: HTTP error, status: {status}")
            );
        }
    }

    #[tokio::test]
    async fn authentication_network_failure_is_reported() {
        let outcome = server("http://127.0.0.1:1")
            .account_data(ACCOUNTS_ENDPOINT)
            .await;
        let text = outcome.into_text();
        assert!(text.starts_with("Error: "), "unexpected text: {text}");
        assert!(text.len() > "Error: ".len());
    }

    #[tokio::test]
    async fn fetch_failure_hides_detail() {
        for status in [401, 500] {
            let mock = MockServer::start().await;
            mount_auth(
                &mock,
                ResponseTemplate::new(200).set_body_json(json!({ "token": "abc123" })),
            )
            .await;
            Mock::given(method("GET"))
                .and(path("/accounts"))
                .respond_with(ResponseTemplate::new(status))
                .mount(&mock)
                .await;

            let result = server(&mock.uri())
                .get_account_data()
                .await
                .expect("tool call returns a result");
            assert_eq!(result.is_error, Some(true));
            let outcome = server(&mock.uri()).account_data(ACCOUNTS_ENDPOINT).await;
            assert_eq!(outcome.into_text(), "Failed to retrieve data from /accounts");
        }
    }

    #[tokio::test]
    async fn repeated_calls_authenticate_each_time() {
        let mock = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "abc123" })))
            .expect(2)
            .mount(&mock)
            .await;
        Mock::given(method("GET"))
            .and(path("/accounts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "acct1" })))
            .expect(2)
            .mount(&mock)
            .await;

        let api = server(&mock.uri());
        let first = api.account_data(ACCOUNTS_ENDPOINT).await.into_text();
        let second = api.account_data(ACCOUNTS_ENDPOINT).await.into_text();
        assert_eq!(first, second);
    }

    #[test]
    fn advertises_tools_capability() {
        let info = rmcp::ServerHandler::get_info(&server("http://127.0.0.1:1"));
        assert!(info.capabilities.tools.is_some());
    }
}
