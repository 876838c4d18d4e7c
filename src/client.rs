//! The Tharsis API client seam.
//!
//! The provider never talks to the network directly. It goes through a
//! [`TharsisClient`], built by a [`Connect`] implementation once the provider is
//! configured. Failures are classified by [`ApiErrorKind`] so callers can branch
//! on the kind instead of inspecting message text.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ProviderConfig;

/// Classification of API failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorKind {
    /// The requested object does not exist.
    NotFound,
    /// The caller is not authenticated.
    Unauthorized,
    /// The caller is authenticated but not allowed to perform the call.
    Forbidden,
    /// The API could not be reached.
    Transport,
    /// Any other server-side failure.
    Internal,
}

/// An error returned by a [`TharsisClient`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind:?}: {message}")]
pub struct ApiError {
    /// What went wrong.
    pub kind: ApiErrorKind,
    /// Human-readable detail from the API.
    pub message: String,
}

impl ApiError {
    /// Create an error of the given kind.
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::NotFound, message)
    }

    /// Create an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Unauthorized, message)
    }

    /// Create a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Forbidden, message)
    }

    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Transport, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Internal, message)
    }

    /// Whether this error means the object does not exist.
    pub fn is_not_found(&self) -> bool {
        self.kind == ApiErrorKind::NotFound
    }
}

/// A Tharsis workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    /// Opaque workspace ID.
    pub id: String,
    /// Full path of the workspace, including its parent groups.
    pub full_path: String,
    /// ID of the latest state version, if the workspace has been applied.
    #[serde(default)]
    pub current_state_version_id: Option<String>,
}

/// One output recorded in a state version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateVersionOutput {
    /// Output name.
    pub name: String,
    /// Output value.
    pub value: serde_json::Value,
    /// Type constraint of the value, as reported by the API.
    #[serde(rename = "type", default)]
    pub type_: serde_json::Value,
    /// Whether the output was declared sensitive.
    #[serde(default)]
    pub sensitive: bool,
}

/// Calls the provider makes against the Tharsis API.
#[async_trait::async_trait]
pub trait TharsisClient: Send + Sync + 'static {
    /// Look up a workspace by its full path.
    async fn get_workspace(&self, full_path: &str) -> Result<Workspace, ApiError>;

    /// List the outputs of a state version.
    async fn get_state_version_outputs(
        &self,
        state_version_id: &str,
    ) -> Result<Vec<StateVersionOutput>, ApiError>;
}

/// Builds a [`TharsisClient`] from provider configuration.
pub trait Connect: Send + Sync + 'static {
    /// The client type produced.
    type Client: TharsisClient;

    /// Create a client for the configured endpoint.
    fn connect(&self, config: &ProviderConfig) -> Result<Self::Client, ApiError>;
}
