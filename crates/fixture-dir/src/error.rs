// error.rs — Error types for fixture directory operations.

use std::io;
use std::path::PathBuf;

use fixture_tree::TreeError;
use thiserror::Error;

/// Errors that can occur while reading, writing, or tracking a directory.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// A subpath resolved outside the directory root (security violation).
    #[error("subpath should not escape directory: '{subpath}' resolves outside {root}")]
    PathEscape { subpath: String, root: PathBuf },

    /// A tree entry name is empty, `.`, `..`, or contains a separator.
    #[error("invalid tree entry name: '{name}'")]
    InvalidEntryName { name: String },

    /// The target of a whole-tree read does not exist.
    #[error("no such file or directory: {path}")]
    NotFound { path: PathBuf },

    /// A directory was expected but something else exists at the path.
    #[error("not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// A file was expected but a directory exists at the path.
    #[error("is a directory: {path}")]
    IsADirectory { path: PathBuf },

    /// The handle was disposed and its root no longer exists.
    #[error("no such file or directory: {path} (handle was disposed)")]
    Disposed { path: PathBuf },

    /// A file I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    /// The external builder failed to build or clean up.
    #[error("builder failed: {0}")]
    Build(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A configuration file could not be parsed.
    #[error("invalid config at {path}: {source}")]
    Config {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Glob, encoding, or fixture JSON error from the tree model.
    #[error(transparent)]
    Tree(#[from] TreeError),
}

impl FixtureError {
    /// Wrap an arbitrary builder failure.
    pub fn build(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        FixtureError::Build(err.into())
    }

    /// True for every "entry not found" signal: a missing target, a disposed
    /// handle, or an underlying I/O error of kind `NotFound`.
    pub fn is_not_found(&self) -> bool {
        match self {
            FixtureError::NotFound { .. } | FixtureError::Disposed { .. } => true,
            FixtureError::Io { source, .. } => source.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

/// Map an `io::Error` for `path` into [`FixtureError::Io`].
pub(crate) fn io_at(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> FixtureError {
    let path = path.into();
    move |source| FixtureError::Io { path, source }
}

pub type Result<T> = std::result::Result<T, FixtureError>;
