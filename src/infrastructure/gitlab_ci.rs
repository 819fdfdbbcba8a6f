//! GitLab CI backend
//!
//! Emits a `.gitlab-ci.yml` with a single job that starts the function
//! image through Docker-in-Docker, with the project checkout mounted as the
//! workspace.

use crate::pipeline::{
    ExportError, ExportResult, ManifestDocuments, Orchestrator, PipelineConfig,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Engine identifier
pub const GITLAB_CI: &str = "gitlab-ci";

/// Names and paths used in the generated configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitLabCISettings {
    /// Stage the job belongs to
    pub stage: String,
    /// Job name
    pub job_name: String,
    /// Image of the job container (needs a Docker client)
    pub docker_image: String,
    /// Docker daemon service
    pub docker_service: String,
    /// Mount point of the checkout inside the function container
    pub workspace_root: String,
    /// Host path of the container runtime socket
    pub socket_path: String,
}

impl Default for GitLabCISettings {
    fn default() -> Self {
        Self {
            stage: "run-functions".to_string(),
            job_name: "functions".to_string(),
            docker_image: "docker".to_string(),
            docker_service: "docker:dind".to_string(),
            workspace_root: "/workspace".to_string(),
            socket_path: "/var/run/docker.sock".to_string(),
        }
    }
}

/// A GitLab CI configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GitLabConfig {
    /// Ordered stage names
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stages: Vec<String>,
    /// Jobs keyed by name
    #[serde(flatten)]
    pub jobs: BTreeMap<String, GitLabJob>,
}

/// A GitLab CI job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GitLabJob {
    /// Stage name
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stage: String,
    /// Job container image
    #[serde(skip_serializing_if = "String::is_empty")]
    pub image: String,
    /// Service containers
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<String>,
    /// Shell lines
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub script: Vec<String>,
}

/// Backend for generating GitLab CI configuration
#[derive(Debug, Clone, Default)]
pub struct GitLabCIBackend {
    settings: GitLabCISettings,
    config: Option<GitLabConfig>,
}

impl GitLabCIBackend {
    /// Creates a new GitLab CI backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend with custom names
    #[must_use]
    pub fn with_settings(settings: GitLabCISettings) -> Self {
        Self {
            settings,
            config: None,
        }
    }

    /// The generated configuration, once initialized
    #[must_use]
    pub fn config(&self) -> Option<&GitLabConfig> {
        self.config.as_ref()
    }

    /// Builds the `docker run` line for the function container
    fn docker_run(&self, config: &PipelineConfig) -> String {
        let settings = &self.settings;
        // $PWD must reach the shell unquoted.
        let mounts = format!(
            "-v $PWD:{root} -v {socket}:{socket}",
            root = settings.workspace_root,
            socket = settings.socket_path,
        );

        let mut command = vec![config.image.clone()];
        command.extend(config.run_args(&settings.workspace_root));

        format!("docker run {mounts} {}", shell_words::join(command))
    }
}

impl Orchestrator for GitLabCIBackend {
    fn init(&mut self, config: &PipelineConfig) -> &mut dyn Orchestrator {
        let script = vec![self.docker_run(config)];
        let settings = &self.settings;
        let stage = sanitize_stage_name(&settings.stage);

        let job = GitLabJob {
            stage: stage.clone(),
            image: settings.docker_image.clone(),
            services: non_empty(&settings.docker_service),
            script,
        };

        self.config = Some(GitLabConfig {
            stages: non_empty(&stage),
            jobs: BTreeMap::from([(sanitize_job_name(&settings.job_name), job)]),
        });
        self
    }

    fn generate(&self) -> ExportResult<Vec<u8>> {
        let config = self.config.as_ref().ok_or(ExportError::NotInitialized {
            orchestrator: GITLAB_CI,
        })?;

        let mut documents = ManifestDocuments::new();
        documents.push_serialized(config)?;
        Ok(documents.into_bytes())
    }

    fn name(&self) -> &'static str {
        GITLAB_CI
    }

    fn file_name(&self) -> &'static str {
        ".gitlab-ci.yml"
    }

    fn description(&self) -> &'static str {
        "GitLab CI configuration"
    }
}

fn non_empty(value: &str) -> Vec<String> {
    if value.is_empty() {
        Vec::new()
    } else {
        vec![value.to_string()]
    }
}

/// Sanitizes stage name for GitLab CI
fn sanitize_stage_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Sanitizes job name for GitLab CI
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_yaml::Value;

    fn generate(config: &PipelineConfig) -> Value {
        let bytes = GitLabCIBackend::new().init(config).generate().unwrap();
        serde_yaml::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_sanitize_stage_name() {
        assert_eq!(sanitize_stage_name("Run Stage"), "Run-Stage");
        assert_eq!(sanitize_stage_name("Test@123"), "Test-123");
    }

    #[test]
    fn test_sanitize_job_name() {
        assert_eq!(sanitize_job_name("Run Stage"), "Run_Stage");
        assert_eq!(sanitize_job_name("Test@123"), "Test_123");
    }

    #[test]
    fn test_stage_and_job() {
        let config = generate(&PipelineConfig::new("resources"));

        assert_eq!(config["stages"][0].as_str(), Some("run-functions"));
        let job = &config["functions"];
        assert_eq!(job["stage"].as_str(), Some("run-functions"));
        assert_eq!(job["image"].as_str(), Some("docker"));
        assert_eq!(job["services"][0].as_str(), Some("docker:dind"));
    }

    #[test]
    fn test_script_runs_image_against_workspace() {
        let config = PipelineConfig::new("resources")
            .with_fn_paths(["functions", "extra/fns"])
            .with_image("gcr.io/example/fn:v1");
        let generated = generate(&config);

        assert_eq!(
            generated["functions"]["script"][0].as_str(),
            Some(
                "docker run -v $PWD:/workspace -v /var/run/docker.sock:/var/run/docker.sock \
                 gcr.io/example/fn:v1 run /workspace/resources \
                 --fn-path /workspace/functions --fn-path /workspace/extra/fns"
            )
        );
    }

    #[test]
    fn test_empty_dir_targets_workspace_root() {
        let generated = generate(&PipelineConfig::new("").with_image("fn:v1"));
        let script = generated["functions"]["script"][0].as_str().unwrap();
        assert!(script.ends_with("fn:v1 run /workspace"));
    }

    #[test]
    fn test_reinit_replaces_previous_config() {
        let mut backend = GitLabCIBackend::new();
        backend.init(&PipelineConfig::new("first").with_fn_path("old"));
        backend.init(&PipelineConfig::new("second"));

        let script = &backend.config().unwrap().jobs["functions"].script;
        assert_eq!(script.len(), 1);
        assert!(script[0].contains("/workspace/second"));
        assert!(!script[0].contains("--fn-path"));
    }

    #[test]
    fn test_empty_settings_are_omitted() {
        let settings = GitLabCISettings {
            stage: String::new(),
            docker_image: String::new(),
            docker_service: String::new(),
            ..GitLabCISettings::default()
        };
        let bytes = GitLabCIBackend::with_settings(settings)
            .init(&PipelineConfig::new("app"))
            .generate()
            .unwrap();
        let out = String::from_utf8(bytes).unwrap();

        assert!(!out.contains("''"));
        assert!(!out.contains("stages"));

        let generated: Value = serde_yaml::from_str(&out).unwrap();
        let job = generated["functions"].as_mapping().unwrap();
        assert_eq!(job.len(), 1);
        assert!(generated["functions"]["script"][0].is_string());
    }

    #[test]
    fn test_generate_before_init_fails() {
        assert_eq!(
            GitLabCIBackend::new().generate(),
            Err(ExportError::NotInitialized {
                orchestrator: GITLAB_CI
            })
        );
    }
}
