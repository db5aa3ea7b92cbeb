//! Error types for secretscan plugin discovery

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for plugin registry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while discovering and importing plugins
#[derive(Debug, Error)]
pub enum Error {
    /// A plugin source file could not be read, parsed, or evaluated
    ///
    /// Aborts the whole import for the path set being computed.
    #[error("failed to import plugin module {module_id} from {}: {reason}", path.display())]
    Import {
        /// File that failed to load
        path: PathBuf,
        /// Module identifier the file was being bound to
        module_id: String,
        /// Underlying failure
        reason: String,
    },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Resource not found
    #[error("not found: {0}")]
    NotFound(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build an import failure for a candidate module
    pub(crate) fn import(
        path: impl Into<PathBuf>,
        module_id: impl Into<String>,
        reason: impl std::fmt::Display,
    ) -> Self {
        Self::Import {
            path: path.into(),
            module_id: module_id.into(),
            reason: reason.to_string(),
        }
    }
}
