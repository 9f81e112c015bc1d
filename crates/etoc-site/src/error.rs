//! Schema error type.

use std::path::PathBuf;

/// Error raised for a malformed table of contents.
///
/// Covers both the current schema (parsing) and the legacy schema
/// (migration), plus failures while loading a ToC file from disk.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// A rule of the current schema is violated at `path`.
    #[error("{message} @ '{path}'")]
    Malformed {
        /// Description of the violated rule.
        message: String,
        /// Location in the mapping (e.g., `/entries/0/`).
        path: String,
    },
    /// A rule of the legacy schema is violated.
    #[error("{0}")]
    Legacy(String),
    /// The same docname is registered twice.
    #[error("document file used multiple times: '{0}'")]
    DuplicateDocname(String),
    /// A docname is reached twice while serializing (cyclic references).
    #[error("'{0}' in site-map multiple times")]
    Cycle(String),
    /// A `FileItem` refers to a docname missing from the site map.
    #[error("entry refers to unknown document: '{0}'")]
    DanglingReference(String),
    /// Unknown value of the `format` key.
    #[error("'format' key not recognised: '{0}'")]
    UnknownFormat(String),
    /// The migrated mapping failed validation.
    #[error("Error parsing migrated output: {0}")]
    MigratedOutput(#[source] Box<SchemaError>),
    /// YAML syntax or serialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// ToC file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// Path of the ToC file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl SchemaError {
    /// Create a [`SchemaError::Malformed`] error.
    pub(crate) fn malformed(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
            path: path.into(),
        }
    }

    /// Create a [`SchemaError::Legacy`] error.
    pub(crate) fn legacy(message: impl Into<String>) -> Self {
        Self::Legacy(message.into())
    }
}
