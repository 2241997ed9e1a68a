//! Outcome of a single `get-account-data` invocation.
//!
//! Each variant maps to one text block in the MCP tool result.

use rmcp::model::{CallToolResult, Content};
use serde_json::Value;

use crate::error::ApiError;

/// Shown when an error has no message of its own.
const UNKNOWN_ERROR: &str = "Unknown error";

/// Result of authenticating and then fetching one endpoint.
#[derive(Debug)]
pub(crate) enum ToolOutcome {
    /// The endpoint returned a JSON body.
    Data {
        /// Endpoint that was fetched.
        endpoint: String,
        /// Decoded response body, passed through untouched.
        payload: Value,
    },
    /// Authentication worked but the data request did not.
    RetrievalFailed {
        /// Endpoint that was requested.
        endpoint: String,
    },
    /// No token could be obtained; the data request was never sent.
    AuthenticationFailed(ApiError),
}

impl ToolOutcome {
    /// Renders the outcome as the text the caller sees.
    pub(crate) fn into_text(self) -> String {
        match self {
            Self::Data { endpoint, payload } => match serde_json::to_string_pretty(&payload) {
                Ok(json) => format!("Data from {endpoint}:\n\n{json}"),
                Err(err) => error_text(&err.to_string()),
            },
            Self::RetrievalFailed { endpoint } => {
                format!("Failed to retrieve data from {endpoint}")
            }
            Self::AuthenticationFailed(err) => error_text(&err.to_string()),
        }
    }

    /// Converts into a tool result, flagging failures as tool errors.
    pub(crate) fn into_call_tool_result(self) -> CallToolResult {
        let is_error = !matches!(self, Self::Data { .. });
        let content = vec![Content::text(self.into_text())];
        if is_error {
            CallToolResult::error(content)
        } else {
            CallToolResult::success(content)
        }
    }
}

/// Formats an error message, falling back when it is empty.
fn error_text(message: &str) -> String {
    let shown = if message.is_empty() {
        UNKNOWN_ERROR
    } else {
        message
    };
    format!("Error: {shown}")
}

#[cfg(test)]
#[allow(
    clippy::missing_docs_in_private_items,
    reason = "test helpers are self-explanatory"
)]
mod tests {
    use serde_json::{Value, json};

    use super::{ToolOutcome, error_text};
    use crate::error::ApiError;

    fn data(payload: Value) -> ToolOutcome {
        ToolOutcome::Data {
            endpoint: "/accounts".to_owned(),
            payload,
        }
    }

    fn retrieval_failed() -> ToolOutcome {
        ToolOutcome::RetrievalFailed {
            endpoint: "/accounts".to_owned(),
        }
    }

    #[test]
    fn data_is_pretty_printed_in_received_order() {
        let payload = json!({ "id": "acct1", "balance": 42 });
        assert_eq!(
            data(payload.clone()).into_text(),
            "Data from /accounts:\n\n{\n  \"id\": \"acct1\",\n  \"balance\": 42\n}"
        );
        assert_ne!(data(payload).into_call_tool_result().is_error, Some(true));
    }

    #[test]
    fn empty_object_is_still_data() {
        assert_eq!(data(json!({})).into_text(), "Data from /accounts:\n\n{}");
    }

    #[test]
    fn null_payload_is_still_data() {
        assert_eq!(data(Value::Null).into_text(), "Data from /accounts:\n\nnull");
        assert_ne!(data(Value::Null).into_call_tool_result().is_error, Some(true));
    }

    #[test]
    fn retrieval_failure_has_no_detail() {
        assert_eq!(
            retrieval_failed().into_text(),
            "Failed to retrieve data from /accounts"
        );
        assert_eq!(retrieval_failed().into_call_tool_result().is_error, Some(true));
    }

    #[test]
    fn authentication_failure_shows_message() {
        assert_eq!(
            ToolOutcome::AuthenticationFailed(ApiError::Status(401)).into_text(),
            "Error: HTTP error, status: 401"
        );
        let result = ToolOutcome::AuthenticationFailed(ApiError::Status(401)).into_call_tool_result();
        assert_eq!(result.is_error, Some(true));
    }

    #[test]
    fn empty_message_falls_back() {
        assert_eq!(error_text(""), "Error: Unknown error");
    }
}
