//! Orchestrator Registry
//!
//! Looks up CI engine backends by name. Backends hold the manifest tree they
//! were initialized with, so the registry stores factories and hands out a
//! fresh instance on every lookup.

use std::collections::HashMap;

use super::github_actions::GitHubActionsBackend;
use super::gitlab_ci::GitLabCIBackend;
use super::tekton::TektonBackend;
use crate::pipeline::{ExportError, ExportResult, Orchestrator};

/// Creates a fresh, uninitialized backend
pub type OrchestratorFactory = fn() -> Box<dyn Orchestrator>;

/// Registry of CI engine backends.
///
/// # Example
///
/// ```
/// use fn_export::prelude::*;
///
/// let registry = OrchestratorRegistry::with_defaults();
/// let mut backend = registry.create("tekton")?;
/// let manifest = backend.init(&PipelineConfig::new("resources")).generate()?;
/// assert!(!manifest.is_empty());
/// # Ok::<(), ExportError>(())
/// ```
#[derive(Default)]
pub struct OrchestratorRegistry {
    factories: HashMap<&'static str, OrchestratorFactory>,
}

impl OrchestratorRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Create a registry holding every built-in backend.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(|| Box::new(TektonBackend::new()));
        registry.register(|| Box::new(GitHubActionsBackend::new()));
        registry.register(|| Box::new(GitLabCIBackend::new()));
        registry
    }

    /// Register a backend factory.
    ///
    /// The name reported by the produced backend is used as the key; an
    /// existing entry with the same name is replaced.
    pub fn register(&mut self, factory: OrchestratorFactory) {
        let name = factory().name();
        self.factories.insert(name, factory);
    }

    /// Create a fresh backend by name.
    ///
    /// # Errors
    /// Returns `ExportError::UnknownOrchestrator` listing the registered
    /// names if `name` is not registered.
    pub fn create(&self, name: &str) -> ExportResult<Box<dyn Orchestrator>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| ExportError::UnknownOrchestrator {
                name: name.to_string(),
                available: self.names().join(", "),
            })?;
        Ok(factory())
    }

    /// Check if a backend is registered.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Get all registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Get information about all registered backends, sorted by name.
    #[must_use]
    pub fn info(&self) -> Vec<OrchestratorInfo> {
        let mut infos: Vec<_> = self
            .factories
            .values()
            .map(|factory| OrchestratorInfo::from_orchestrator(factory().as_ref()))
            .collect();
        infos.sort_by_key(|info| info.name);
        infos
    }

    /// Get the number of registered backends.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

/// Information about a registered backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorInfo {
    /// Engine name (CLI flag value).
    pub name: &'static str,
    /// Conventional output file name.
    pub file_name: &'static str,
    /// Human-readable description.
    pub description: &'static str,
}

impl OrchestratorInfo {
    /// Create info from a backend.
    #[must_use]
    pub fn from_orchestrator(orchestrator: &dyn Orchestrator) -> Self {
        Self {
            name: orchestrator.name(),
            file_name: orchestrator.file_name(),
            description: orchestrator.description(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::PipelineConfig;

    struct EchoBackend {
        dir: Option<String>,
    }

    impl Orchestrator for EchoBackend {
        fn init(&mut self, config: &PipelineConfig) -> &mut dyn Orchestrator {
            self.dir = Some(config.dir.clone());
            self
        }

        fn generate(&self) -> ExportResult<Vec<u8>> {
            self.dir
                .clone()
                .map(String::into_bytes)
                .ok_or(ExportError::NotInitialized { orchestrator: "echo" })
        }

        fn name(&self) -> &'static str {
            "echo"
        }

        fn file_name(&self) -> &'static str {
            "echo.txt"
        }
    }

    #[test]
    fn test_defaults_are_registered() {
        let registry = OrchestratorRegistry::with_defaults();
        assert_eq!(registry.names(), vec!["github-actions", "gitlab-ci", "tekton"]);
        assert_eq!(registry.len(), 3);
        assert!(registry.has("tekton"));
    }

    #[test]
    fn test_unknown_name_lists_available() {
        let registry = OrchestratorRegistry::with_defaults();
        let err = registry.create("jenkins").err().unwrap();
        assert_eq!(
            err,
            ExportError::UnknownOrchestrator {
                name: "jenkins".to_string(),
                available: "github-actions, gitlab-ci, tekton".to_string(),
            }
        );
    }

    #[test]
    fn test_create_returns_fresh_instances() {
        let registry = OrchestratorRegistry::with_defaults();

        let mut first = registry.create("tekton").unwrap();
        first.init(&PipelineConfig::new("resources"));
        assert!(first.generate().is_ok());

        let second = registry.create("tekton").unwrap();
        assert!(matches!(
            second.generate(),
            Err(ExportError::NotInitialized { .. })
        ));
    }

    #[test]
    fn test_custom_backend_without_touching_defaults() {
        let mut registry = OrchestratorRegistry::with_defaults();
        registry.register(|| Box::new(EchoBackend { dir: None }));

        let out = registry
            .create("echo")
            .unwrap()
            .init(&PipelineConfig::new("configs"))
            .generate()
            .unwrap();
        assert_eq!(out, b"configs");
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_info_sorted() {
        let registry = OrchestratorRegistry::with_defaults();
        let info = registry.info();
        assert_eq!(info[2].name, "tekton");
        assert_eq!(info[2].file_name, "pipeline.yaml");
        assert_eq!(info[1].file_name, ".gitlab-ci.yml");
    }

    #[test]
    fn test_empty_registry() {
        let registry = OrchestratorRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.create("tekton").is_err());
    }
}
