//! CLI error types.

use docdex_catalog::CatalogError;
use docdex_config::ConfigError;
use docdex_store::StoreError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Catalog(#[from] CatalogError),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("git clone of {repo} failed: {message}")]
    Git { repo: String, message: String },

    #[error("{0}")]
    Validation(String),
}
