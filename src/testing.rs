//! Testing utilities for the provider.
//!
//! [`ProviderTester`] drives a [`ProviderService`] directly, and
//! [`InMemoryClient`] stands in for the Tharsis API.
//!
//! # Example
//!
//! ```
//! use tharsis_provider::client::Workspace;
//! use tharsis_provider::path::GroupPathSource;
//! use tharsis_provider::testing::{InMemoryClient, ProviderTester};
//! use tharsis_provider::TharsisProvider;
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let client = InMemoryClient::new();
//! client.add_workspace(Workspace {
//!     id: "W_1".to_string(),
//!     full_path: "group/network".to_string(),
//!     current_state_version_id: None,
//! });
//!
//! let provider = TharsisProvider::new(client)
//!     .with_group_path_source(GroupPathSource::fixed("group/apps"));
//! let tester = ProviderTester::new(provider);
//!
//! tester.configure(json!({"host": "https://tharsis.example"})).await.unwrap();
//! let state = tester
//!     .read_data_source("tharsis_workspace_outputs", json!({"path": "../network"}))
//!     .await
//!     .unwrap();
//! assert_eq!(state["workspace_id"], "W_1");
//! # });
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;

use crate::client::{ApiError, Connect, StateVersionOutput, TharsisClient, Workspace};
use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::schema::{Diagnostic, ProviderSchema};
use crate::service::ProviderService;

/// A test harness around a [`ProviderService`].
pub struct ProviderTester<P: ProviderService> {
    provider: P,
}

impl<P: ProviderService> ProviderTester<P> {
    /// Create a new tester for the given provider.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Get a reference to the underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Get the provider's schema.
    pub fn schema(&self) -> ProviderSchema {
        self.provider.schema()
    }

    /// Get the list of data source type names.
    pub fn data_source_types(&self) -> Vec<String> {
        self.provider.metadata().data_sources
    }

    /// Validate provider configuration, failing on any error diagnostic.
    pub async fn validate_provider_config(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.validate_provider_config(config).await?;
        check_diagnostics(diagnostics)
    }

    /// Configure the provider, failing on any error diagnostic.
    pub async fn configure(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.configure(config).await?;
        check_diagnostics(diagnostics)
    }

    /// Stop the provider.
    pub async fn stop(&self) -> Result<(), ProviderError> {
        self.provider.stop().await
    }

    /// Validate a data source configuration, failing on any error diagnostic.
    pub async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<(), TestError> {
        let diagnostics = self
            .provider
            .validate_data_source_config(data_source_type, config)
            .await?;
        check_diagnostics(diagnostics)
    }

    /// Read a data source.
    pub async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        self.provider
            .read_data_source(data_source_type, config)
            .await
    }

    /// Validate then read a data source, as the host does during a plan.
    pub async fn validate_and_read(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, TestError> {
        self.validate_data_source_config(data_source_type, config.clone())
            .await?;
        Ok(self.read_data_source(data_source_type, config).await?)
    }
}

/// Error type for test operations that may fail with diagnostics.
#[derive(Debug)]
pub enum TestError {
    /// The operation failed with diagnostics.
    Diagnostics(Vec<Diagnostic>),
    /// The operation failed with a provider error.
    Provider(ProviderError),
}

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestError::Diagnostics(diags) => {
                writeln!(f, "Operation failed with {} diagnostic(s):", diags.len())?;
                for diag in diags {
                    write!(f, "  [{:?}] {}", diag.severity, diag.summary)?;
                    if let Some(detail) = &diag.detail {
                        write!(f, ": {}", detail)?;
                    }
                    if let Some(attr) = &diag.attribute {
                        write!(f, " (at {})", attr)?;
                    }
                    writeln!(f)?;
                }
                Ok(())
            },
            TestError::Provider(e) => write!(f, "Provider error: {}", e),
        }
    }
}

impl std::error::Error for TestError {}

impl From<ProviderError> for TestError {
    fn from(e: ProviderError) -> Self {
        TestError::Provider(e)
    }
}

fn check_diagnostics(diagnostics: Vec<Diagnostic>) -> Result<(), TestError> {
    let errors: Vec<_> = diagnostics.into_iter().filter(|d| d.is_error()).collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(TestError::Diagnostics(errors))
    }
}

#[derive(Default)]
struct MemoryState {
    workspaces: HashMap<String, Workspace>,
    outputs: HashMap<String, Vec<StateVersionOutput>>,
    failure: Option<ApiError>,
    refuse_connect: Option<ApiError>,
    connected_with: Option<ProviderConfig>,
}

/// An in-memory stand-in for the Tharsis API.
///
/// Clones share state, so a test can keep a handle after passing the client
/// to a provider as its connector.
#[derive(Clone, Default)]
pub struct InMemoryClient {
    state: Arc<Mutex<MemoryState>>,
    calls: Arc<AtomicUsize>,
}

impl InMemoryClient {
    /// Create an empty client.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a workspace under its full path.
    pub fn add_workspace(&self, workspace: Workspace) {
        self.state()
            .workspaces
            .insert(workspace.full_path.clone(), workspace);
    }

    /// Register the outputs of a state version.
    pub fn add_outputs(&self, state_version_id: &str, outputs: Vec<StateVersionOutput>) {
        self.state()
            .outputs
            .insert(state_version_id.to_string(), outputs);
    }

    /// Make every subsequent API call fail with `err`.
    pub fn fail_with(&self, err: ApiError) {
        self.state().failure = Some(err);
    }

    /// Make [`Connect::connect`] fail with `err`.
    pub fn refuse_connections(&self, err: ApiError) {
        self.state().refuse_connect = Some(err);
    }

    /// Number of API calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Configuration passed to the last successful connect.
    pub fn connected_with(&self) -> Option<ProviderConfig> {
        self.state().connected_with.clone()
    }

    fn begin_call(&self) -> Result<MutexGuard<'_, MemoryState>, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state();
        if let Some(err) = state.failure.clone() {
            return Err(err);
        }
        Ok(state)
    }
}

#[async_trait::async_trait]
impl TharsisClient for InMemoryClient {
    async fn get_workspace(&self, full_path: &str) -> Result<Workspace, ApiError> {
        let state = self.begin_call()?;
        state
            .workspaces
            .get(full_path)
            .cloned()
            .ok_or_else(|| ApiError::not_found(format!("workspace {} not found", full_path)))
    }

    async fn get_state_version_outputs(
        &self,
        state_version_id: &str,
    ) -> Result<Vec<StateVersionOutput>, ApiError> {
        let state = self.begin_call()?;
        state
            .outputs
            .get(state_version_id)
            .cloned()
            .ok_or_else(|| {
                ApiError::not_found(format!("state version {} not found", state_version_id))
            })
    }
}

impl Connect for InMemoryClient {
    type Client = InMemoryClient;

    fn connect(&self, config: &ProviderConfig) -> Result<Self::Client, ApiError> {
        let mut state = self.state();
        if let Some(err) = &state.refuse_connect {
            return Err(err.clone());
        }
        state.connected_with = Some(config.clone());
        Ok(self.clone())
    }
}

/// Assert that diagnostics contain no errors.
///
/// # Panics
///
/// Panics if there are any error diagnostics.
pub fn assert_no_errors(diagnostics: &[Diagnostic]) {
    let errors: Vec<_> = diagnostics.iter().filter(|d| d.is_error()).collect();

    assert!(
        errors.is_empty(),
        "Expected no errors, but got {} error(s): {:?}",
        errors.len(),
        errors.iter().map(|d| &d.summary).collect::<Vec<_>>()
    );
}

/// Assert that diagnostics contain at least one error.
///
/// # Panics
///
/// Panics if there are no error diagnostics.
pub fn assert_has_errors(diagnostics: &[Diagnostic]) {
    assert!(
        diagnostics.iter().any(Diagnostic::is_error),
        "Expected at least one error, but got none"
    );
}

/// Assert that diagnostics contain an error whose summary contains `substring`.
///
/// # Panics
///
/// Panics if no error diagnostic matches.
pub fn assert_error_contains(diagnostics: &[Diagnostic], substring: &str) {
    let has_matching_error = diagnostics
        .iter()
        .any(|d| d.is_error() && d.summary.contains(substring));

    assert!(
        has_matching_error,
        "Expected an error containing '{}', but no matching error found. Errors: {:?}",
        substring,
        diagnostics
            .iter()
            .filter(|d| d.is_error())
            .map(|d| &d.summary)
            .collect::<Vec<_>>()
    );
}
