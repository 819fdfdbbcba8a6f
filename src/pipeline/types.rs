//! Core contracts for manifest generation
//!
//! [`Orchestrator`] is implemented once per target CI engine. Every engine
//! consumes the same [`PipelineConfig`] and owns the shape of its own
//! manifest tree.

use super::PipelineConfig;
use super::errors::ExportResult;

/// A CI engine that can turn a [`PipelineConfig`] into a manifest.
///
/// The lifecycle is `init` once, then `generate`. Calling `init` again
/// rebuilds the tree from scratch; nothing from an earlier configuration
/// survives.
///
/// # Example
///
/// ```
/// use fn_export::prelude::*;
///
/// let config = PipelineConfig::new("resources").with_fn_path("functions");
/// let manifest = TektonBackend::new().init(&config).generate()?;
/// assert!(String::from_utf8_lossy(&manifest).contains("kind: Pipeline"));
/// # Ok::<(), ExportError>(())
/// ```
pub trait Orchestrator: Send + Sync {
    /// Builds the manifest tree for `config`, replacing any previous one.
    fn init(&mut self, config: &PipelineConfig) -> &mut dyn Orchestrator;

    /// Serializes the manifest tree.
    ///
    /// # Errors
    /// Returns `ExportError::NotInitialized` if `init` was never called, or
    /// `ExportError::Serialization` if the serializer rejects the tree.
    fn generate(&self) -> ExportResult<Vec<u8>>;

    /// Engine identifier used for lookup (e.g. `tekton`)
    fn name(&self) -> &'static str;

    /// Conventional file name for the generated manifest
    fn file_name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str {
        "CI pipeline manifest"
    }
}

/// Trait for types that can be validated
#[allow(clippy::missing_errors_doc)]
pub trait Validate {
    /// Type of validation error
    type Error;

    /// Validates this type
    fn validate(&self) -> std::result::Result<(), Self::Error>;
}
