//! Error types for configuration loading and upstream API calls.

/// Failure to build a [`Config`](crate::config::Config) from the environment.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigError {
    /// A required variable is unset or empty.
    #[error("missing configuration: {name} environment variable is required")]
    Missing {
        /// Variable name.
        name: &'static str,
    },

    /// A variable is set but cannot be used.
    #[error("invalid configuration: {name}: {reason}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// What is wrong with the value.
        reason: String,
    },
}

/// Failure of a request against the account API.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ApiError {
    /// The API answered with a non-success status.
    #[error("HTTP error, status: {0}")]
    Status(u16),

    /// Transport failure, timeout, or an undecodable body.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// The authentication response carried no usable bearer token.
    #[error("authentication response did not contain a token: {0}")]
    InvalidToken(#[source] serde_json::Error),
}

#[cfg(test)]
#[allow(
    clippy::missing_docs_in_private_items,
    reason = "test names describe the behavior"
)]
mod tests {
    use super::{ApiError, ConfigError};

    #[test]
    fn status_error_names_the_code() {
        assert_eq!(ApiError::Status(401).to_string(), "HTTP error, status: 401");
    }

    #[test]
    fn missing_config_names_the_variable() {
        let err = ConfigError::Missing { name: "API_KEY" };
        assert!(err.to_string().contains("API_KEY"));
    }
}
