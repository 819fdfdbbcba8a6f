//! GitHub Actions backend
//!
//! Emits a workflow that checks out the repository and runs the function
//! image as a Docker container action against the checkout.

use crate::pipeline::{
    ExportError, ExportResult, ManifestDocuments, Orchestrator, PipelineConfig,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Engine identifier
pub const GITHUB_ACTIONS: &str = "github-actions";

/// Names used in the generated workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubActionsSettings {
    /// Workflow display name
    pub workflow_name: String,
    /// Job identifier
    pub job_name: String,
    /// Branch whose pushes trigger the workflow
    pub branch: String,
    /// Runner label
    pub runner: String,
    /// Action used to check out the repository
    pub checkout_action: String,
}

impl Default for GitHubActionsSettings {
    fn default() -> Self {
        Self {
            workflow_name: "run-functions".to_string(),
            job_name: "functions".to_string(),
            branch: "main".to_string(),
            runner: "ubuntu-latest".to_string(),
            checkout_action: "actions/checkout@v4".to_string(),
        }
    }
}

/// A GitHub Actions workflow file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Workflow {
    /// Workflow name
    pub name: String,
    /// Trigger events
    pub on: Triggers,
    /// Jobs keyed by identifier
    pub jobs: BTreeMap<String, Job>,
}

/// Workflow triggers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Triggers {
    /// Push trigger
    pub push: PushTrigger,
}

/// Push trigger filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushTrigger {
    /// Branches to react to; all branches when empty
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub branches: Vec<String>,
}

/// A workflow job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Job {
    /// Runner label
    pub runs_on: String,
    /// Steps in order
    pub steps: Vec<JobStep>,
}

/// A job step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JobStep {
    /// Step display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Action reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uses: Option<String>,
    /// Action inputs
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub with: BTreeMap<String, String>,
}

/// Backend for generating GitHub Actions workflows
#[derive(Debug, Clone, Default)]
pub struct GitHubActionsBackend {
    settings: GitHubActionsSettings,
    workflow: Option<Workflow>,
}

impl GitHubActionsBackend {
    /// Creates a new GitHub Actions backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend with custom names
    #[must_use]
    pub fn with_settings(settings: GitHubActionsSettings) -> Self {
        Self {
            settings,
            workflow: None,
        }
    }

    /// The generated workflow, once initialized
    #[must_use]
    pub fn workflow(&self) -> Option<&Workflow> {
        self.workflow.as_ref()
    }
}

impl Orchestrator for GitHubActionsBackend {
    fn init(&mut self, config: &PipelineConfig) -> &mut dyn Orchestrator {
        let settings = &self.settings;

        let checkout = JobStep {
            name: Some("Checkout".to_string()),
            uses: Some(settings.checkout_action.clone()),
            ..JobStep::default()
        };
        // Container actions run with the checkout as working directory.
        let run = JobStep {
            name: Some("Run functions".to_string()),
            uses: Some(format!("docker://{}", config.image)),
            with: BTreeMap::from([(
                "args".to_string(),
                shell_words::join(config.run_args(".")),
            )]),
        };

        let job = Job {
            runs_on: settings.runner.clone(),
            steps: vec![checkout, run],
        };
        let branches = if settings.branch.is_empty() {
            Vec::new()
        } else {
            vec![settings.branch.clone()]
        };

        self.workflow = Some(Workflow {
            name: settings.workflow_name.clone(),
            on: Triggers {
                push: PushTrigger { branches },
            },
            jobs: BTreeMap::from([(sanitize_job_name(&settings.job_name), job)]),
        });
        self
    }

    fn generate(&self) -> ExportResult<Vec<u8>> {
        let workflow = self
            .workflow
            .as_ref()
            .ok_or(ExportError::NotInitialized {
                orchestrator: GITHUB_ACTIONS,
            })?;

        let mut documents = ManifestDocuments::new();
        documents.push_serialized(workflow)?;
        Ok(documents.into_bytes())
    }

    fn name(&self) -> &'static str {
        GITHUB_ACTIONS
    }

    fn file_name(&self) -> &'static str {
        "main.yaml"
    }

    fn description(&self) -> &'static str {
        "GitHub Actions workflow"
    }
}

/// Sanitizes job name for GitHub Actions
fn sanitize_job_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
