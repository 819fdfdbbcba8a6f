//! Engine-agnostic pipeline domain

pub mod documents;
pub mod errors;
pub mod paths;
pub mod types;

use serde::{Deserialize, Serialize};

pub use documents::{DOCUMENT_SEPARATOR, ManifestDocuments};
pub use errors::{ExportError, ExportResult, ValidationError};
pub use paths::{escapes_workspace, join_workspace_path};
pub use types::{Orchestrator, Validate};

/// Container image used when the caller does not pick one
pub const DEFAULT_IMAGE: &str = "gcr.io/kpt-dev/kpt:latest";

/// Describes one function run against a directory of configuration.
///
/// All paths are relative to the root of the workspace the CI engine checks
/// out or mounts. They are joined onto an engine-specific root when a
/// manifest is generated and are never resolved locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory holding the configuration to run functions against.
    pub dir: String,

    /// Extra function search paths, in lookup order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fn_paths: Vec<String>,

    /// Container image to execute.
    pub image: String,
}

impl PipelineConfig {
    /// Creates a configuration for `dir` using [`DEFAULT_IMAGE`].
    #[must_use]
    pub fn new(dir: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            fn_paths: Vec::new(),
            image: DEFAULT_IMAGE.to_string(),
        }
    }

    /// Appends a function search path.
    #[must_use]
    pub fn with_fn_path(mut self, path: impl Into<String>) -> Self {
        self.fn_paths.push(path.into());
        self
    }

    /// Appends several function search paths, keeping their order.
    #[must_use]
    pub fn with_fn_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fn_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Sets the container image.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// Iterates over the target directory followed by every function path.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.dir.as_str()).chain(self.fn_paths.iter().map(String::as_str))
    }

    /// Builds the function runner arguments with every path joined onto
    /// `root`: `run <dir>` followed by one `--fn-path <path>` pair per
    /// function path.
    #[must_use]
    pub fn run_args(&self, root: &str) -> Vec<String> {
        let mut args = Vec::with_capacity(2 + 2 * self.fn_paths.len());
        args.push("run".to_string());
        args.push(join_workspace_path(root, &self.dir));
        for fn_path in &self.fn_paths {
            args.push("--fn-path".to_string());
            args.push(join_workspace_path(root, fn_path));
        }
        args
    }
}

impl Validate for PipelineConfig {
    type Error = ValidationError;

    fn validate(&self) -> Result<(), Self::Error> {
        if self.image.trim().is_empty() {
            return Err(ValidationError::EmptyImage);
        }

        for path in self.paths() {
            if path.starts_with('/') {
                return Err(ValidationError::AbsolutePath {
                    path: path.to_string(),
                });
            }
            if escapes_workspace(path) {
                return Err(ValidationError::EscapesWorkspace {
                    path: path.to_string(),
                });
            }
        }

        Ok(())
    }
}
