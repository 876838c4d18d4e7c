//! Workspace outputs data sources.
//!
//! `tharsis_workspace_outputs` and `tharsis_workspace_outputs_json` both read
//! the outputs of a workspace's current state version. They differ only in how
//! values are returned: as-is, or each encoded as a JSON string.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::client::TharsisClient;
use crate::error::ProviderError;
use crate::path::GroupPathSource;
use crate::schema::{Attribute, AttributeFlags, AttributeType, Diagnostic, Schema};

/// Data source returning output values as-is.
pub const WORKSPACE_OUTPUTS: &str = "tharsis_workspace_outputs";

/// Data source returning output values encoded as JSON strings.
pub const WORKSPACE_OUTPUTS_JSON: &str = "tharsis_workspace_outputs_json";

/// How output values are written to state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputEncoding {
    /// Values are kept as they are.
    Raw,
    /// Values are serialized to JSON strings.
    Json,
}

impl OutputEncoding {
    /// Encoding used by the named data source type, if it is one of ours.
    pub fn for_data_source(data_source_type: &str) -> Option<Self> {
        match data_source_type {
            WORKSPACE_OUTPUTS => Some(Self::Raw),
            WORKSPACE_OUTPUTS_JSON => Some(Self::Json),
            _ => None,
        }
    }

    fn encode(self, value: serde_json::Value) -> Result<serde_json::Value, ProviderError> {
        match self {
            Self::Raw => Ok(value),
            Self::Json => Ok(serde_json::Value::String(serde_json::to_string(&value)?)),
        }
    }

    fn value_type(self) -> AttributeType {
        match self {
            Self::Raw => AttributeType::Dynamic,
            Self::Json => AttributeType::String,
        }
    }
}

/// Configuration of a workspace outputs block.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkspaceOutputsConfig {
    /// Full or relative workspace path.
    pub path: String,
}

/// State written for a workspace outputs block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceOutputsState {
    /// Path as configured.
    pub path: String,
    /// Resolved full path of the workspace.
    pub full_path: String,
    /// Workspace ID.
    pub workspace_id: String,
    /// State version the outputs were read from.
    pub state_version_id: Option<String>,
    /// Output values keyed by name.
    pub outputs: BTreeMap<String, serde_json::Value>,
}

/// Schema shared by both workspace outputs data sources.
pub fn workspace_outputs_schema(encoding: OutputEncoding) -> Schema {
    Schema::v0()
        .with_description("Outputs of the current state version of a Tharsis workspace.")
        .with_attribute(
            "path",
            Attribute::required_string().with_description(
                "Full path of the workspace, or a path relative to the current group \
                 such as `../workspace` or `./subgroup/workspace`.",
            ),
        )
        .with_attribute(
            "full_path",
            Attribute::computed_string().with_description("Resolved full path of the workspace."),
        )
        .with_attribute("workspace_id", Attribute::computed_string())
        .with_attribute("state_version_id", Attribute::computed_string())
        .with_attribute(
            "outputs",
            Attribute::new(
                AttributeType::map(encoding.value_type()),
                AttributeFlags::computed(),
            )
            .sensitive(),
        )
}

/// Extra checks beyond the schema for a workspace outputs block.
pub fn validate_config(config: &serde_json::Value) -> Vec<Diagnostic> {
    match config.get("path").and_then(|p| p.as_str()) {
        Some(path) if path.trim().is_empty() => vec![Diagnostic::error("Invalid path")
            .with_detail("path must not be empty")
            .with_attribute("path")],
        _ => vec![],
    }
}

/// Read the outputs of the workspace named by `config`.
///
/// The path is resolved before any API call; a resolution failure aborts the
/// read.
pub async fn read_workspace_outputs<C: TharsisClient + ?Sized>(
    client: &C,
    group_path: &GroupPathSource,
    encoding: OutputEncoding,
    config: serde_json::Value,
) -> Result<WorkspaceOutputsState, ProviderError> {
    let config: WorkspaceOutputsConfig = serde_json::from_value(config)?;
    let full_path = group_path.resolve(&config.path)?;
    debug!(path = %config.path, full_path = %full_path, "Resolved workspace path");

    let workspace = client.get_workspace(&full_path).await?;

    let mut outputs = BTreeMap::new();
    if let Some(state_version_id) = &workspace.current_state_version_id {
        for output in client.get_state_version_outputs(state_version_id).await? {
            outputs.insert(output.name, encoding.encode(output.value)?);
        }
    }

    info!(
        full_path = %workspace.full_path,
        outputs = outputs.len(),
        "Read workspace outputs"
    );

    Ok(WorkspaceOutputsState {
        path: config.path,
        full_path: workspace.full_path,
        workspace_id: workspace.id,
        state_version_id: workspace.current_state_version_id,
        outputs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ApiError, StateVersionOutput, Workspace};
    use crate::path::PathError;
    use crate::testing::InMemoryClient;
    use serde_json::json;

    fn client() -> InMemoryClient {
        let client = InMemoryClient::new();
        client.add_workspace(Workspace {
            id: "W_1".to_string(),
            full_path: "group/network".to_string(),
            current_state_version_id: Some("SV_1".to_string()),
        });
        client.add_outputs(
            "SV_1",
            vec![
                StateVersionOutput {
                    name: "vpc_id".to_string(),
                    value: json!("vpc-123"),
                    type_: json!("string"),
                    sensitive: false,
                },
                StateVersionOutput {
                    name: "subnets".to_string(),
                    value: json!(["a", "b"]),
                    type_: json!(["list", "string"]),
                    sensitive: false,
                },
            ],
        );
        client.add_workspace(Workspace {
            id: "W_2".to_string(),
            full_path: "group/empty".to_string(),
            current_state_version_id: None,
        });
        client
    }

    #[tokio::test]
    async fn test_read_relative_path() {
        let client = client();
        let state = read_workspace_outputs(
            &client,
            &GroupPathSource::fixed("group/subgroup"),
            OutputEncoding::Raw,
            json!({"path": "../network"}),
        )
        .await
        .unwrap();

        assert_eq!(state.path, "../network");
        assert_eq!(state.full_path, "group/network");
        assert_eq!(state.workspace_id, "W_1");
        assert_eq!(state.state_version_id.as_deref(), Some("SV_1"));
        assert_eq!(state.outputs["vpc_id"], json!("vpc-123"));
        assert_eq!(state.outputs["subnets"], json!(["a", "b"]));
    }

    #[tokio::test]
    async fn test_read_json_encoding() {
        let client = client();
        let state = read_workspace_outputs(
            &client,
            &GroupPathSource::unset(),
            OutputEncoding::Json,
            json!({"path": "group/network"}),
        )
        .await
        .unwrap();

        assert_eq!(state.outputs["vpc_id"], json!("\"vpc-123\""));
        assert_eq!(state.outputs["subnets"], json!("[\"a\",\"b\"]"));
    }

    #[tokio::test]
    async fn test_read_without_state_version() {
        let client = client();
        let state = read_workspace_outputs(
            &client,
            &GroupPathSource::unset(),
            OutputEncoding::Raw,
            json!({"path": "group/empty"}),
        )
        .await
        .unwrap();

        assert!(state.state_version_id.is_none());
        assert!(state.outputs.is_empty());
    }

    #[tokio::test]
    async fn test_path_error_skips_api_call() {
        let client = client();
        let err = read_workspace_outputs(
            &client,
            &GroupPathSource::fixed("group/subgroup"),
            OutputEncoding::Raw,
            json!({"path": "../../network"}),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ProviderError::Path(PathError::NoParentGroup)));
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_workspace() {
        let client = client();
        let err = read_workspace_outputs(
            &client,
            &GroupPathSource::fixed("group"),
            OutputEncoding::Raw,
            json!({"path": "missing"}),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ProviderError::NotFound(_)));
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn test_api_failure_kind_preserved() {
        let client = client();
        client.fail_with(ApiError::forbidden("not a member of group"));
        let err = read_workspace_outputs(
            &client,
            &GroupPathSource::unset(),
            OutputEncoding::Raw,
            json!({"path": "group/network"}),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ProviderError::PermissionDenied(_)));
    }

    #[tokio::test]
    async fn test_malformed_config() {
        let client = client();
        let err = read_workspace_outputs(
            &client,
            &GroupPathSource::unset(),
            OutputEncoding::Raw,
            json!({"path": 7}),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ProviderError::Serialization(_)));
    }

    #[test]
    fn test_encoding_for_data_source() {
        assert_eq!(
            OutputEncoding::for_data_source(WORKSPACE_OUTPUTS),
            Some(OutputEncoding::Raw)
        );
        assert_eq!(
            OutputEncoding::for_data_source(WORKSPACE_OUTPUTS_JSON),
            Some(OutputEncoding::Json)
        );
        assert_eq!(OutputEncoding::for_data_source("tharsis_group"), None);
    }

    #[test]
    fn test_schema_by_encoding() {
        let raw = workspace_outputs_schema(OutputEncoding::Raw);
        assert_eq!(
            raw.attributes["outputs"].attr_type,
            AttributeType::map(AttributeType::Dynamic)
        );
        assert!(raw.attributes["outputs"].flags.sensitive);
        assert!(raw.attributes["path"].flags.required);

        let json = workspace_outputs_schema(OutputEncoding::Json);
        assert_eq!(
            json.attributes["outputs"].attr_type,
            AttributeType::map(AttributeType::String)
        );
    }

    #[test]
    fn test_validate_empty_path() {
        assert_eq!(validate_config(&json!({"path": " "})).len(), 1);
        assert!(validate_config(&json!({"path": "group/ws"})).is_empty());
        assert!(validate_config(&json!({})).is_empty());
    }
}
