//! Convenience types shared by providers and their hosts.

use serde::{Deserialize, Serialize};

/// Provider metadata returned to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProviderMetadata {
    /// Data source type names.
    pub data_sources: Vec<String>,
}

/// Name under which the provider registers with its host.
pub const PROVIDER_NAME: &str = "tharsis";
