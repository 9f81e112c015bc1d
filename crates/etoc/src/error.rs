//! CLI error types.

use etoc_config::ConfigError;
use etoc_fs::SiteError;
use etoc_site::SchemaError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Schema(#[from] SchemaError),

    #[error("{0}")]
    Site(#[from] SiteError),
}
