//! Error types for the Tharsis provider.

use thiserror::Error;

use crate::client::{ApiError, ApiErrorKind};
use crate::path::PathError;
use crate::schema::Diagnostic;

/// Errors that can occur while serving provider requests.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested object was not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// A validation error occurred.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A configuration error occurred.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The requested data source type is unknown.
    #[error("Unknown data source type: {0}")]
    UnknownDataSource(String),

    /// Operation failed due to current state (precondition not met).
    #[error("Failed precondition: {0}")]
    FailedPrecondition(String),

    /// Permission denied (authentication/authorization failure).
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The API could not be reached.
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// The API returned an error that has no more specific variant.
    #[error("API error: {0}")]
    Api(String),

    /// A workspace path could not be resolved.
    #[error("Failed to resolve path: {0}")]
    Path(#[from] PathError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ProviderError {
    /// Get the error message without the variant prefix.
    pub fn message(&self) -> String {
        match self {
            Self::NotFound(msg)
            | Self::Validation(msg)
            | Self::Configuration(msg)
            | Self::UnknownDataSource(msg)
            | Self::FailedPrecondition(msg)
            | Self::PermissionDenied(msg)
            | Self::Unavailable(msg)
            | Self::Api(msg) => msg.clone(),
            Self::Path(err) => err.to_string(),
            Self::Serialization(err) => err.to_string(),
        }
    }

    /// Render this error as an error diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let summary = match self {
            Self::Path(_) => "Failed to resolve workspace path",
            Self::Configuration(_) => "Invalid provider configuration",
            Self::NotFound(_) => "Workspace not found",
            _ => "Provider error",
        };
        Diagnostic::error(summary).with_detail(self.message())
    }
}

impl From<ApiError> for ProviderError {
    fn from(err: ApiError) -> Self {
        match err.kind {
            ApiErrorKind::NotFound => ProviderError::NotFound(err.message),
            ApiErrorKind::Unauthorized | ApiErrorKind::Forbidden => {
                ProviderError::PermissionDenied(err.message)
            },
            ApiErrorKind::Transport => ProviderError::Unavailable(err.message),
            ApiErrorKind::Internal => ProviderError::Api(err.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DiagnosticSeverity;

    #[test]
    fn test_error_display() {
        let err = ProviderError::NotFound("group/ws".to_string());
        assert_eq!(format!("{}", err), "Resource not found: group/ws");

        let err = ProviderError::UnknownDataSource("tharsis_nope".to_string());
        assert_eq!(format!("{}", err), "Unknown data source type: tharsis_nope");

        let err = ProviderError::Path(PathError::NoParentGroup);
        assert_eq!(
            format!("{}", err),
            "Failed to resolve path: workspace must exist under at least one parent group"
        );
    }

    #[test]
    fn test_api_error_mapping() {
        let err: ProviderError = ApiError::not_found("workspace a/b").into();
        assert!(matches!(err, ProviderError::NotFound(ref m) if m == "workspace a/b"));

        let err: ProviderError = ApiError::unauthorized("expired token").into();
        assert!(matches!(err, ProviderError::PermissionDenied(_)));

        let err: ProviderError = ApiError::forbidden("no access").into();
        assert!(matches!(err, ProviderError::PermissionDenied(_)));

        let err: ProviderError = ApiError::transport("connection refused").into();
        assert!(matches!(err, ProviderError::Unavailable(_)));

        let err: ProviderError = ApiError::internal("boom").into();
        assert!(matches!(err, ProviderError::Api(_)));
    }

    #[test]
    fn test_message_method() {
        let err = ProviderError::Configuration("missing host".to_string());
        assert_eq!(err.message(), "missing host");

        let err: ProviderError = PathError::InvalidBasePath.into();
        assert_eq!(err.message(), "received an invalid base path value");
    }

    #[test]
    fn test_to_diagnostic() {
        let diag = ProviderError::from(PathError::NoParentGroup).to_diagnostic();
        assert_eq!(diag.severity, DiagnosticSeverity::Error);
        assert_eq!(diag.summary, "Failed to resolve workspace path");
        assert_eq!(
            diag.detail.as_deref(),
            Some("workspace must exist under at least one parent group")
        );
    }
}
