//! Error types for filesystem operations.

use std::path::PathBuf;

use etoc_site::SchemaError;

/// Semantic error categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum SiteErrorKind {
    /// Path is not a directory, already exists, or cannot be read/written
    /// (including an unreadable ToC file).
    Filesystem,
    /// Project layout cannot be mapped to a site (no root index, duplicate docnames).
    Structure,
    /// The ToC file is malformed.
    Schema,
    /// Metadata or options have the wrong type or value.
    Config,
}

/// Error raised while building a site map from disk or writing one to disk.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// Folder to assess is not a directory.
    #[error("path must be a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Root folder has no qualifying document.
    #[error("path does not contain a root file: {}", .0.display())]
    NoRootIndex(PathBuf),

    /// Two folders map to the same docname.
    #[error("docname registered twice while building site map: '{0}'")]
    DuplicateDocname(String),

    /// Target file exists and overwriting is disabled.
    #[error("Path already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    /// I/O failure on a path.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Invalid metadata or options.
    #[error("{0}")]
    Config(String),

    /// ToC failed to load or validate.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl SiteError {
    /// Semantic category of the error.
    #[must_use]
    pub fn kind(&self) -> SiteErrorKind {
        match self {
            Self::NotADirectory(_)
            | Self::AlreadyExists(_)
            | Self::Io { .. }
            | Self::Schema(SchemaError::Io { .. }) => SiteErrorKind::Filesystem,
            Self::NoRootIndex(_) | Self::DuplicateDocname(_) => SiteErrorKind::Structure,
            Self::Config(_) => SiteErrorKind::Config,
            Self::Schema(_) => SiteErrorKind::Schema,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
