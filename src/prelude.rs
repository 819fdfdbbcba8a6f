//! Prelude module for common imports

pub use crate::pipeline::documents::{DOCUMENT_SEPARATOR, ManifestDocuments};
pub use crate::pipeline::errors::{ExportError, ExportResult, ValidationError};
pub use crate::pipeline::types::{Orchestrator, Validate};
pub use crate::pipeline::{DEFAULT_IMAGE, PipelineConfig};

pub use crate::infrastructure::{
    GitHubActionsBackend, GitLabCIBackend, OrchestratorRegistry, TektonBackend,
};
