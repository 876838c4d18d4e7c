//! Provider configuration.
//!
//! The provider block accepts `host` and `static_token`. Either may be left out
//! and supplied through the environment instead:
//!
//! - `THARSIS_ENDPOINT`: API endpoint, used when `host` is not set
//! - `THARSIS_STATIC_TOKEN`: API token, used when `static_token` is not set
//!
//! Values from the provider block always win over the environment.

use std::fmt;

use serde::Deserialize;

use crate::error::ProviderError;

/// Environment variable holding the API endpoint.
pub const ENDPOINT_ENV: &str = "THARSIS_ENDPOINT";

/// Environment variable holding a static API token.
pub const STATIC_TOKEN_ENV: &str = "THARSIS_STATIC_TOKEN";

/// Resolved provider configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Base URL of the Tharsis API.
    pub endpoint: String,
    /// Token sent with every request, if any.
    pub static_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    static_token: Option<String>,
}

impl ProviderConfig {
    /// Build configuration from the provider block and the process environment.
    pub fn from_value(config: &serde_json::Value) -> Result<Self, ProviderError> {
        Self::from_sources(config, |name| std::env::var(name).ok())
    }

    /// Build configuration from the provider block and an environment lookup.
    pub fn from_sources<F>(config: &serde_json::Value, env: F) -> Result<Self, ProviderError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = match config {
            serde_json::Value::Null => RawConfig::default(),
            value => RawConfig::deserialize(value).map_err(|e| {
                ProviderError::Configuration(format!("invalid provider configuration: {}", e))
            })?,
        };

        let endpoint = raw.host.or_else(|| env(ENDPOINT_ENV)).ok_or_else(|| {
            ProviderError::Configuration(format!(
                "an API endpoint must be set with the host attribute or the {} environment variable",
                ENDPOINT_ENV
            ))
        })?;

        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(ProviderError::Configuration(format!(
                "endpoint must start with http:// or https://, got: {}",
                endpoint
            )));
        }

        let static_token = raw.static_token.or_else(|| env(STATIC_TOKEN_ENV));
        if static_token.as_deref() == Some("") {
            return Err(ProviderError::Configuration(
                "static token must not be empty".to_string(),
            ));
        }

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            static_token,
        })
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("endpoint", &self.endpoint)
            .field(
                "static_token",
                &self.static_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}
