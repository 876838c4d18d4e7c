//! The Tharsis provider.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};

use crate::client::Connect;
use crate::config::ProviderConfig;
use crate::data_source::{self, OutputEncoding, WORKSPACE_OUTPUTS, WORKSPACE_OUTPUTS_JSON};
use crate::error::ProviderError;
use crate::path::GroupPathSource;
use crate::schema::{Attribute, Diagnostic, ProviderSchema, Schema};
use crate::service::ProviderService;
use crate::types::PROVIDER_NAME;
use crate::validation::validate;

/// Provider serving Tharsis data sources.
///
/// The provider holds no client until [`configure`](ProviderService::configure)
/// succeeds. Relative workspace paths are resolved against `group_path`,
/// looked up on every read.
pub struct TharsisProvider<K: Connect> {
    connector: K,
    group_path: GroupPathSource,
    client: RwLock<Option<Arc<K::Client>>>,
}

impl<K: Connect> TharsisProvider<K> {
    /// Create a provider that builds its client with `connector`.
    pub fn new(connector: K) -> Self {
        Self {
            connector,
            group_path: GroupPathSource::default(),
            client: RwLock::new(None),
        }
    }

    /// Use `source` for the base group path instead of the environment.
    pub fn with_group_path_source(mut self, source: GroupPathSource) -> Self {
        self.group_path = source;
        self
    }

    /// The base group path source in use.
    pub fn group_path_source(&self) -> &GroupPathSource {
        &self.group_path
    }

    /// Whether `configure` has completed successfully.
    pub async fn is_configured(&self) -> bool {
        self.client.read().await.is_some()
    }

    fn provider_schema() -> Schema {
        Schema::v0()
            .with_attribute(
                "host",
                Attribute::optional_string().with_description(
                    "Tharsis API endpoint. Defaults to the THARSIS_ENDPOINT environment variable.",
                ),
            )
            .with_attribute(
                "static_token",
                Attribute::optional_string()
                    .sensitive()
                    .with_description(
                        "Static API token. Defaults to the THARSIS_STATIC_TOKEN environment variable.",
                    ),
            )
    }

    fn data_source_schema(&self, data_source_type: &str) -> Result<Schema, ProviderError> {
        OutputEncoding::for_data_source(data_source_type)
            .map(data_source::workspace_outputs_schema)
            .ok_or_else(|| ProviderError::UnknownDataSource(data_source_type.to_string()))
    }
}

#[async_trait::async_trait]
impl<K: Connect> ProviderService for TharsisProvider<K> {
    fn schema(&self) -> ProviderSchema {
        ProviderSchema::new()
            .with_provider_config(Self::provider_schema())
            .with_data_source(
                WORKSPACE_OUTPUTS,
                data_source::workspace_outputs_schema(OutputEncoding::Raw),
            )
            .with_data_source(
                WORKSPACE_OUTPUTS_JSON,
                data_source::workspace_outputs_schema(OutputEncoding::Json),
            )
    }

    async fn validate_provider_config(
        &self,
        config: serde_json::Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        Ok(validate(&Self::provider_schema(), &config))
    }

    #[instrument(skip(self, config), name = "provider.configure")]
    async fn configure(&self, config: serde_json::Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let diagnostics = validate(&Self::provider_schema(), &config);
        if diagnostics.iter().any(Diagnostic::is_error) {
            warn!(
                diagnostics = diagnostics.len(),
                "Configure rejected invalid provider block"
            );
            return Ok(diagnostics);
        }

        let config = match ProviderConfig::from_value(&config) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "Configure failed");
                return Ok(vec![e.to_diagnostic()]);
            },
        };

        let client = match self.connector.connect(&config) {
            Ok(client) => client,
            Err(e) => {
                error!(endpoint = %config.endpoint, error = %e, "Failed to create API client");
                return Ok(vec![ProviderError::from(e).to_diagnostic()]);
            },
        };

        *self.client.write().await = Some(Arc::new(client));
        info!(
            provider = PROVIDER_NAME,
            endpoint = %config.endpoint,
            static_token = config.static_token.is_some(),
            "Provider configured"
        );
        Ok(diagnostics)
    }

    async fn stop(&self) -> Result<(), ProviderError> {
        debug!("Releasing API client");
        self.client.write().await.take();
        Ok(())
    }

    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: serde_json::Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let schema = self.data_source_schema(data_source_type)?;
        let mut diagnostics = validate(&schema, &config);
        diagnostics.extend(data_source::validate_config(&config));
        Ok(diagnostics)
    }

    #[instrument(skip(self, config), name = "provider.read_data_source")]
    async fn read_data_source(
        &self,
        data_source_type: &str,
        config: serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError> {
        let encoding = OutputEncoding::for_data_source(data_source_type)
            .ok_or_else(|| ProviderError::UnknownDataSource(data_source_type.to_string()))?;

        let client = self.client.read().await.clone().ok_or_else(|| {
            ProviderError::FailedPrecondition(
                "provider must be configured before reading data sources".to_string(),
            )
        })?;

        match data_source::read_workspace_outputs(client.as_ref(), &self.group_path, encoding, config)
            .await
        {
            Ok(state) => Ok(serde_json::to_value(state)?),
            Err(e) => {
                error!(data_source_type = %data_source_type, error = %e, "ReadDataSource failed");
                Err(e)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ApiError, StateVersionOutput, Workspace};
    use crate::testing::{assert_error_contains, assert_no_errors, InMemoryClient};
    use serde_json::json;

    fn seeded_client() -> InMemoryClient {
        let client = InMemoryClient::new();
        client.add_workspace(Workspace {
            id: "W_1".to_string(),
            full_path: "platform/network".to_string(),
            current_state_version_id: Some("SV_9".to_string()),
        });
        client.add_outputs(
            "SV_9",
            vec![StateVersionOutput {
                name: "cidr".to_string(),
                value: json!("10.0.0.0/16"),
                type_: json!("string"),
                sensitive: false,
            }],
        );
        client
    }

    fn provider(client: InMemoryClient) -> TharsisProvider<InMemoryClient> {
        TharsisProvider::new(client)
            .with_group_path_source(GroupPathSource::fixed("platform/apps"))
    }

    #[test]
    fn test_schema_lists_data_sources() {
        let provider = provider(InMemoryClient::new());
        let metadata = provider.metadata();
        assert_eq!(
            metadata.data_sources,
            vec![WORKSPACE_OUTPUTS.to_string(), WORKSPACE_OUTPUTS_JSON.to_string()]
        );
        assert!(provider
            .schema()
            .provider
            .attributes
            .contains_key("static_token"));
    }

    #[tokio::test]
    async fn test_configure_and_read() {
        let provider = provider(seeded_client());
        let diagnostics = provider
            .configure(json!({"host": "https://tharsis.example", "static_token": "t"}))
            .await
            .unwrap();
        assert_no_errors(&diagnostics);
        assert!(provider.is_configured().await);

        let state = provider
            .read_data_source(WORKSPACE_OUTPUTS, json!({"path": "../network"}))
            .await
            .unwrap();
        assert_eq!(state["full_path"], "platform/network");
        assert_eq!(state["workspace_id"], "W_1");
        assert_eq!(state["outputs"]["cidr"], "10.0.0.0/16");
    }

    #[tokio::test]
    async fn test_read_before_configure() {
        let provider = provider(seeded_client());
        let err = provider
            .read_data_source(WORKSPACE_OUTPUTS, json!({"path": "platform/network"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::FailedPrecondition(_)));
    }

    #[tokio::test]
    async fn test_unknown_data_source() {
        let provider = provider(seeded_client());
        let err = provider
            .read_data_source("tharsis_group", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::UnknownDataSource(_)));

        let err = provider
            .validate_data_source_config("tharsis_group", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::UnknownDataSource(_)));
    }

    #[tokio::test]
    async fn test_configure_reports_invalid_endpoint() {
        let provider = provider(seeded_client());
        let diagnostics = provider
            .configure(json!({"host": "tharsis.example"}))
            .await
            .unwrap();
        assert_error_contains(&diagnostics, "Invalid provider configuration");
        assert!(!provider.is_configured().await);
    }

    #[tokio::test]
    async fn test_configure_rejects_unknown_attribute() {
        let provider = provider(seeded_client());
        let diagnostics = provider
            .configure(json!({"host": "https://a.b", "region": "x"}))
            .await
            .unwrap();
        assert_error_contains(&diagnostics, "Unsupported attribute");
        assert!(!provider.is_configured().await);
    }

    #[tokio::test]
    async fn test_configure_connect_failure() {
        let client = seeded_client();
        client.refuse_connections(ApiError::unauthorized("invalid token"));
        let provider = provider(client);
        let diagnostics = provider
            .configure(json!({"host": "https://a.b", "static_token": "bad"}))
            .await
            .unwrap();
        assert_error_contains(&diagnostics, "Provider error");
        assert!(!provider.is_configured().await);
    }

    #[tokio::test]
    async fn test_validate_data_source_config() {
        let provider = provider(seeded_client());
        let diagnostics = provider
            .validate_data_source_config(WORKSPACE_OUTPUTS_JSON, json!({"path": ""}))
            .await
            .unwrap();
        assert_error_contains(&diagnostics, "Invalid path");

        let diagnostics = provider
            .validate_data_source_config(WORKSPACE_OUTPUTS, json!({}))
            .await
            .unwrap();
        assert_error_contains(&diagnostics, "Missing required attribute");
    }

    #[tokio::test]
    async fn test_stop_releases_client() {
        let provider = provider(seeded_client());
        provider
            .configure(json!({"host": "https://a.b"}))
            .await
            .unwrap();
        assert!(provider.is_configured().await);

        provider.stop().await.unwrap();
        assert!(!provider.is_configured().await);
    }
}
