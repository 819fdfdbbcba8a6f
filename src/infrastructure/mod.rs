//! Infrastructure layer
//!
//! This module contains the CI engine backends and the adapters the command
//! line tool is built from.

mod config;
mod github_actions;
mod gitlab_ci;
mod logging;
pub mod package;
pub mod printers;
mod registry;
pub mod tekton;

pub use config::Config;
pub use github_actions::{GITHUB_ACTIONS, GitHubActionsBackend, GitHubActionsSettings};
pub use gitlab_ci::{GITLAB_CI, GitLabCIBackend, GitLabCISettings};
pub use logging::init_logging;
pub use package::{DEFAULT_FILENAME_PATTERN, PackageSummary, materialize};
pub use printers::{Printer, ProgressEvent, default_printer, get_printer, supported_printers};
pub use registry::{OrchestratorFactory, OrchestratorInfo, OrchestratorRegistry};
pub use tekton::{TEKTON, TektonBackend, TektonSettings};
