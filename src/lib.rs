//! # fn-export - CI pipeline manifests for configuration functions
//!
//! fn-export describes "run this containerized function against a directory
//! of configuration" once and turns it into the native pipeline definition
//! of a CI engine, ready to be submitted as is.
//!
//! ## Quick Start
//!
//! ```
//! use fn_export::prelude::*;
//!
//! let config = PipelineConfig::new("resources").with_fn_path("functions");
//! let manifest = OrchestratorRegistry::with_defaults()
//!     .create("tekton")?
//!     .init(&config)
//!     .generate()?;
//! assert!(String::from_utf8_lossy(&manifest).contains("kind: Task"));
//! # Ok::<(), ExportError>(())
//! ```
//!
//! ## Engines
//!
//! - **Tekton**: a `Task` plus a `Pipeline` referencing it, as two documents
//! - **GitHub Actions**: a workflow running the image as a container action
//! - **GitLab CI**: a job starting the image through Docker-in-Docker
//!
//! New engines implement [`Orchestrator`] and are added to an
//! [`OrchestratorRegistry`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod infrastructure;
pub mod pipeline;

// Prelude module for common imports
pub mod prelude;

// Re-export commonly used types
pub use infrastructure::{
    Config, GitHubActionsBackend, GitLabCIBackend, OrchestratorRegistry, PackageSummary, Printer,
    ProgressEvent, TektonBackend, get_printer, init_logging, materialize,
};
pub use pipeline::{
    DEFAULT_IMAGE, ExportError, ExportResult, ManifestDocuments, Orchestrator, PipelineConfig,
    Validate, ValidationError,
};

/// Version of the fn-export crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
