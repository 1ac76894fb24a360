//! CLI error types.

use panview_config::ConfigError;
use panview_site::ContextError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Context(#[from] ContextError),

    #[error("{0}")]
    Server(String),

    #[error("{0}")]
    Validation(String),
}
