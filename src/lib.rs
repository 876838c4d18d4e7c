//! Tharsis Provider
//!
//! Data sources for the Tharsis infrastructure platform, served to an
//! infrastructure-as-code host through the [`ProviderService`] trait.
//!
//! # Overview
//!
//! - **Path resolution**: full or relative workspace paths, see [`path`]
//! - **Data sources**: `tharsis_workspace_outputs` and
//!   `tharsis_workspace_outputs_json`, see [`data_source`]
//! - **API seam**: the [`TharsisClient`](client::TharsisClient) trait with
//!   classified errors, see [`client`]
//! - **Configuration**: provider block with environment fallbacks, see [`config`]
//! - **Logging**: `tracing` to stderr, see [`logging`]
//! - **Testing**: an in-memory API and a provider harness, see [`testing`]
//!
//! # Relative paths
//!
//! ```text
//! data "tharsis_workspace_outputs" "network" {
//!   path = "../network"
//! }
//! ```
//!
//! Run inside group `platform/apps`, this reads the outputs of
//! `platform/network`. The current group comes from the `THARSIS_GROUP_PATH`
//! environment variable unless the provider is given a
//! [`GroupPathSource`](path::GroupPathSource).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod data_source;
pub mod error;
pub mod logging;
pub mod path;
pub mod provider;
pub mod schema;
pub mod service;
pub mod testing;
pub mod types;
pub mod validation;

pub use error::ProviderError;
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use path::{resolve_path, GroupPathSource, PathError, GROUP_PATH_ENV};
pub use provider::TharsisProvider;
pub use schema::ProviderSchema;
pub use service::ProviderService;
pub use types::{ProviderMetadata, PROVIDER_NAME};
pub use validation::{is_valid, validate, validate_result};

pub use async_trait::async_trait;
pub use serde_json;
pub use tracing;
