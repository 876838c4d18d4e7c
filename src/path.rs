//! Workspace path resolution.
//!
//! Data sources accept either a full workspace path (`group/subgroup/workspace`)
//! or a path relative to the "current group" (`../workspace`, `./deep/workspace`,
//! `workspace`). Relative paths are anchored to a base group path, which is
//! normally supplied by the run environment through [`GROUP_PATH_ENV`].
//!
//! # Example
//!
//! ```
//! use tharsis_provider::path::{resolve_path, PathError};
//!
//! let base = Some("group/subgroup");
//!
//! assert_eq!(resolve_path("../workspace", base).unwrap(), "group/workspace");
//! assert_eq!(resolve_path("workspace", base).unwrap(), "group/subgroup/workspace");
//! assert_eq!(resolve_path("deepgroup/workspace", None).unwrap(), "deepgroup/workspace");
//! assert_eq!(resolve_path("../../workspace", base), Err(PathError::NoParentGroup));
//! ```

use thiserror::Error;

/// Environment variable holding the group the current run belongs to.
pub const GROUP_PATH_ENV: &str = "THARSIS_GROUP_PATH";

/// Errors returned when a relative path cannot be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// A relative path was given but no base path is available.
    #[error("relative path was provided but the {var} environment variable was undefined")]
    MissingBasePath {
        /// Name of the environment variable that was consulted.
        var: String,
    },

    /// The base path is present but empty.
    #[error("received an invalid base path value")]
    InvalidBasePath,

    /// The resolved path has no parent group.
    #[error("workspace must exist under at least one parent group")]
    NoParentGroup,
}

/// Resolve `raw` into a full path, anchoring relative input at `base`.
///
/// A path that contains `/` but no `./` is taken to be a full path already and
/// is returned unchanged, whatever `base` holds. Anything else (a bare segment,
/// or a path with `./` / `../` segments) is joined onto `base` and cleaned
/// lexically.
///
/// `base` of `None` is reported as [`PathError::MissingBasePath`] naming
/// [`GROUP_PATH_ENV`].
pub fn resolve_path(raw: &str, base: Option<&str>) -> Result<String, PathError> {
    resolve_with_var(raw, base, GROUP_PATH_ENV)
}

fn resolve_with_var(raw: &str, base: Option<&str>, var: &str) -> Result<String, PathError> {
    if is_full_path(raw) {
        return Ok(raw.to_string());
    }

    let base = match base {
        None => {
            return Err(PathError::MissingBasePath {
                var: var.to_string(),
            })
        },
        Some("") => return Err(PathError::InvalidBasePath),
        Some(base) => base,
    };

    let resolved = clean_segments(base.split('/').chain(raw.split('/'))).join("/");
    if !resolved.contains('/') {
        return Err(PathError::NoParentGroup);
    }

    Ok(resolved)
}

fn is_full_path(raw: &str) -> bool {
    raw.contains('/') && !raw.contains("./")
}

/// Lexically clean a sequence of segments rooted at a virtual `/`.
///
/// Empty and `.` segments are dropped, `..` removes the previous segment and
/// stops at the root.
fn clean_segments<'a>(segments: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut stack = Vec::new();
    for segment in segments {
        match segment {
            "" | "." => {},
            ".." => {
                stack.pop();
            },
            name => stack.push(name),
        }
    }
    stack
}

/// Where a provider obtains the base group path for relative resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupPathSource {
    /// Read the named environment variable on every lookup.
    Env(String),
    /// Use a fixed value; `None` behaves like an unset variable.
    Fixed(Option<String>),
}

impl GroupPathSource {
    /// Source backed by [`GROUP_PATH_ENV`].
    pub fn env() -> Self {
        Self::Env(GROUP_PATH_ENV.to_string())
    }

    /// Source with a fixed base path.
    pub fn fixed(base: impl Into<String>) -> Self {
        Self::Fixed(Some(base.into()))
    }

    /// Source with no base path at all.
    pub fn unset() -> Self {
        Self::Fixed(None)
    }

    /// Current base path, if any.
    pub fn lookup(&self) -> Option<String> {
        match self {
            Self::Env(var) => std::env::var_os(var).map(|v| v.to_string_lossy().into_owned()),
            Self::Fixed(base) => base.clone(),
        }
    }

    /// Resolve `raw` against this source's current base path.
    pub fn resolve(&self, raw: &str) -> Result<String, PathError> {
        let var = match self {
            Self::Env(var) => var.as_str(),
            Self::Fixed(_) => GROUP_PATH_ENV,
        };
        resolve_with_var(raw, self.lookup().as_deref(), var)
    }
}

impl Default for GroupPathSource {
    fn default() -> Self {
        Self::env()
    }
}
