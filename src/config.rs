//! Runtime configuration read from the process environment.
//!
//! All values are loaded once at startup so that a missing variable is
//! reported before any request reaches the API.

use core::fmt;
use core::time::Duration;
use std::path::PathBuf;

use crate::error::ConfigError;

/// Credential key sent in the authentication form.
const API_KEY: &str = "API_KEY";
/// Credential secret sent in the authentication form.
const API_SECRET: &str = "API_SECRET";
/// Prefix for every request URL.
const API_BASE_URL: &str = "API_BASE_URL";
/// Value of the `x-account-id` header.
const ACCOUNT_ID: &str = "ACCOUNT_ID";
/// Optional per-request timeout in whole seconds.
const API_TIMEOUT_SECS: &str = "API_TIMEOUT_SECS";

/// Settings for talking to the account API.
pub(crate) struct Config {
    /// Base URL, concatenated literally with request paths.
    pub(crate) base_url: String,
    /// Account the requests act on.
    pub(crate) account_id: String,
    /// Credential key.
    pub(crate) api_key: String,
    /// Credential secret.
    pub(crate) api_secret: String,
    /// Request timeout; `None` waits indefinitely.
    pub(crate) timeout: Option<Duration>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("account_id", &self.account_id)
            .field("api_key", &"<redacted>")
            .field("api_secret", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Config {
    /// Loads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a required variable is missing or the
    /// timeout is not a positive integer.
    pub(crate) fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads the configuration through an arbitrary variable lookup.
    ///
    /// Empty values count as missing.
    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            api_key: required(&lookup, API_KEY)?,
            api_secret: required(&lookup, API_SECRET)?,
            base_url: required(&lookup, API_BASE_URL)?,
            account_id: required(&lookup, ACCOUNT_ID)?,
            timeout: timeout(&lookup)?,
        })
    }
}

/// Accepts the result of loading a `.env` file.
///
/// A missing file yields `Ok(None)`; unreadable or malformed files are
/// returned as errors.
pub(crate) fn optional_env_file(
    loaded: Result<PathBuf, dotenvy::Error>,
) -> Result<Option<PathBuf>, dotenvy::Error> {
    match loaded {
        Ok(path) => Ok(Some(path)),
        Err(err) if err.not_found() => Ok(None),
        Err(err) => Err(err),
    }
}

/// Reads a variable that must be present and non-empty.
fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::Missing { name })
}

/// Parses the optional request timeout.
fn timeout<F>(lookup: &F) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(API_TIMEOUT_SECS).filter(|value| !value.trim().is_empty()) else {
        return Ok(None);
    };
    let secs: u64 = raw.trim().parse().map_err(|err: core::num::ParseIntError| {
        ConfigError::Invalid {
            name: API_TIMEOUT_SECS,
            reason: err.to_string(),
        }
    })?;
    if secs == 0 {
        return Err(ConfigError::Invalid {
            name: API_TIMEOUT_SECS,
            reason: "must be greater than zero".to_owned(),
        });
    }
    Ok(Some(Duration::from_secs(secs)))
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
    use core::time::Duration;
    use std::collections::HashMap;

    use super::{Config, optional_env_file};
    use crate::error::ConfigError;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|&(key, value)| (key.to_owned(), value.to_owned()))
            .collect()
    }

    fn full_env() -> HashMap<String, String> {
        env(&[
            ("API_KEY", "key-1"),
            ("API_SECRET", "secret-1"),
            ("API_BASE_URL", "https://api.test"),
            ("ACCOUNT_ID", "acct1"),
        ])
    }

    fn load(vars: &HashMap<String, String>) -> Result<Config, ConfigError> {
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn loads_all_required_values() {
        let config = load(&full_env()).expect("complete environment loads");
        assert_eq!(config.api_key, "key-1");
        assert_eq!(config.api_secret, "secret-1");
        assert_eq!(config.base_url, "https://api.test");
        assert_eq!(config.account_id, "acct1");
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn missing_variable_is_reported_by_name() {
        for name in ["API_KEY", "API_SECRET", "API_BASE_URL", "ACCOUNT_ID"] {
            let mut vars = full_env();
            let _removed = vars.remove(name);
            match load(&vars) {
                Err(ConfigError::Missing { name: missing }) => assert_eq!(missing, name),
                other => panic!("expected missing {name}, got {other:?}"),
            }
        }
    }

    #[test]
    fn empty_variable_counts_as_missing() {
        let mut vars = full_env();
        let _previous = vars.insert("ACCOUNT_ID".to_owned(), String::new());
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Missing { name: "ACCOUNT_ID" })
        ));
    }

    #[test]
    fn parses_timeout() {
        let mut vars = full_env();
        let _previous = vars.insert("API_TIMEOUT_SECS".to_owned(), "15".to_owned());
        let config = load(&vars).expect("timeout parses");
        assert_eq!(config.timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn rejects_bad_timeout() {
        for raw in ["soon", "0", "-3"] {
            let mut vars = full_env();
            let _previous = vars.insert("API_TIMEOUT_SECS".to_owned(), raw.to_owned());
            assert!(
                matches!(
                    load(&vars),
                    Err(ConfigError::Invalid {
                        name: "API_TIMEOUT_SECS",
                        ..
                    })
                ),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn debug_output_hides_credentials() {
        let config = load(&full_env()).expect("complete environment loads");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("key-1"));
        assert!(!rendered.contains("secret-1"));
        assert!(rendered.contains("acct1"));
    }

    #[test]
    fn missing_env_file_is_ignored() {
        let loaded = Err(dotenvy::Error::Io(std::io::Error::from(
            std::io::ErrorKind::NotFound,
        )));
        assert!(matches!(optional_env_file(loaded), Ok(None)));
    }

    #[test]
    fn malformed_env_file_is_reported() {
        let loaded = Err(dotenvy::Error::LineParse("API_KEY key-1".to_owned(), 7));
        assert!(matches!(
            optional_env_file(loaded),
            Err(dotenvy::Error::LineParse(_, 7))
        ));
    }

    #[test]
    fn unreadable_env_file_is_reported() {
        let loaded = Err(dotenvy::Error::Io(std::io::Error::from(
            std::io::ErrorKind::PermissionDenied,
        )));
        assert!(matches!(optional_env_file(loaded), Err(dotenvy::Error::Io(_))));
    }
}
