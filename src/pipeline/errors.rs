//! Error types for manifest generation

use thiserror::Error;

/// Result type for export operations
pub type ExportResult<T> = std::result::Result<T, ExportError>;

/// Errors that can occur while generating or materializing manifests
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    /// The serializer rejected the manifest tree
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// `generate` was called before `init`
    #[error("Orchestrator '{orchestrator}' was not initialized before generate")]
    NotInitialized {
        /// Name of the orchestrator that was misused.
        orchestrator: &'static str,
    },

    /// No orchestrator is registered under the requested name
    #[error("Unknown orchestrator '{name}'. Available: {available}")]
    UnknownOrchestrator {
        /// Requested name.
        name: String,
        /// Comma separated list of registered names.
        available: String,
    },

    /// Input could not be parsed into resources
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration was rejected
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_yaml::Error> for ExportError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Validation errors for a pipeline configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Image cannot be empty
    #[error("Image cannot be empty")]
    EmptyImage,

    /// Path must be relative to the workspace root
    #[error("Path must be relative to the workspace: '{path}'")]
    AbsolutePath {
        /// The offending path.
        path: String,
    },

    /// Path climbs out of the workspace root
    #[error("Path escapes the workspace: '{path}'")]
    EscapesWorkspace {
        /// The offending path.
        path: String,
    },
}
