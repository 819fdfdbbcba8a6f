//! Tekton backend
//!
//! Generates a Tekton `Task` that runs the function image against the
//! workspace, plus a `Pipeline` that references it. Tekton only resolves a
//! `taskRef` against objects submitted alongside the pipeline, so both are
//! emitted together: task first, pipeline second.

pub mod schema;

use crate::pipeline::{
    ExportError, ExportResult, ManifestDocuments, Orchestrator, PipelineConfig,
};
use schema::{
    HostPath, Metadata, Pipeline, PipelineSpec, PipelineTask, Step, Task, TaskRef, TaskSpec,
    Volume, VolumeMount, Workspace,
};

/// Engine identifier
pub const TEKTON: &str = "tekton";

/// API version stamped on every emitted object
pub const TEKTON_API_VERSION: &str = "tekton.dev/v1beta1";

/// Names and paths baked into the generated manifests.
///
/// None of these come from the [`PipelineConfig`]; they are fixed so that
/// the same configuration always yields the same bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TektonSettings {
    /// Name of the `Task` object (also used for the pipeline and the step)
    pub task_name: String,
    /// Name of the entry in `Pipeline.spec.tasks`
    pub pipeline_task_name: String,
    /// Workspace slot declared by the pipeline
    pub pipeline_workspace: String,
    /// Workspace mounted by the task
    pub task_workspace: String,
    /// Mount path of the task workspace
    pub task_mount_path: String,
    /// Volume name of the container runtime socket
    pub socket_volume: String,
    /// Host path of the container runtime socket
    pub socket_path: String,
}

impl Default for TektonSettings {
    fn default() -> Self {
        Self {
            task_name: "run-functions".to_string(),
            pipeline_task_name: "functions".to_string(),
            pipeline_workspace: "shared-workspace".to_string(),
            task_workspace: "source".to_string(),
            task_mount_path: "/source".to_string(),
            socket_volume: "docker-socket".to_string(),
            socket_path: "/var/run/docker.sock".to_string(),
        }
    }
}

impl TektonSettings {
    /// Placeholder Tekton substitutes with the task workspace path at run time
    #[must_use]
    pub fn workspace_root(&self) -> String {
        format!("$(workspaces.{}.path)", self.task_workspace)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TektonManifest {
    task: Task,
    pipeline: Pipeline,
}

/// Builds Tekton `Task` + `Pipeline` manifests
#[derive(Debug, Clone, Default)]
pub struct TektonBackend {
    settings: TektonSettings,
    manifest: Option<TektonManifest>,
}

impl TektonBackend {
    /// Creates a builder with the default names
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder with custom names
    #[must_use]
    pub fn with_settings(settings: TektonSettings) -> Self {
        Self {
            settings,
            manifest: None,
        }
    }

    /// Names used by this builder
    #[must_use]
    pub fn settings(&self) -> &TektonSettings {
        &self.settings
    }

    /// The generated `Task`, once initialized
    #[must_use]
    pub fn task(&self) -> Option<&Task> {
        self.manifest.as_ref().map(|m| &m.task)
    }

    /// The generated `Pipeline`, once initialized
    #[must_use]
    pub fn pipeline(&self) -> Option<&Pipeline> {
        self.manifest.as_ref().map(|m| &m.pipeline)
    }
}

impl Orchestrator for TektonBackend {
    fn init(&mut self, config: &PipelineConfig) -> &mut dyn Orchestrator {
        let settings = &self.settings;

        let task = build_task(settings, config);
        let pipeline_task = PipelineTask {
            name: settings.pipeline_task_name.clone(),
            task_ref: Some(TaskRef {
                name: settings.task_name.clone(),
            }),
            run_after: Vec::new(),
            workspaces: present(Workspace::bound(
                &settings.task_workspace,
                &settings.pipeline_workspace,
            )),
        };
        let pipeline = Pipeline {
            api_version: TEKTON_API_VERSION.to_string(),
            kind: "Pipeline".to_string(),
            metadata: Some(Metadata::named(&settings.task_name)),
            spec: Some(PipelineSpec {
                workspaces: present(Workspace::declared(&settings.pipeline_workspace)),
                tasks: vec![pipeline_task],
            }),
        };

        self.manifest = Some(TektonManifest { task, pipeline });
        self
    }

    fn generate(&self) -> ExportResult<Vec<u8>> {
        let manifest = self
            .manifest
            .as_ref()
            .ok_or(ExportError::NotInitialized {
                orchestrator: TEKTON,
            })?;

        let mut documents = ManifestDocuments::new();
        documents.push_serialized(&manifest.task)?;
        documents.push_serialized(&manifest.pipeline)?;
        Ok(documents.into_bytes())
    }

    fn name(&self) -> &'static str {
        TEKTON
    }

    fn file_name(&self) -> &'static str {
        "pipeline.yaml"
    }

    fn description(&self) -> &'static str {
        "Tekton Task and Pipeline"
    }
}

/// Drops a workspace whose name and binding are both empty
fn present(workspace: Workspace) -> Vec<Workspace> {
    if workspace.is_empty() {
        Vec::new()
    } else {
        vec![workspace]
    }
}

/// Builds the single-step task that runs the function image
fn build_task(settings: &TektonSettings, config: &PipelineConfig) -> Task {
    let root = settings.workspace_root();

    let step = Step {
        name: settings.task_name.clone(),
        image: config.image.clone(),
        args: config.run_args(&root),
        // The function image launches containers itself.
        volume_mounts: vec![VolumeMount {
            name: settings.socket_volume.clone(),
            mount_path: settings.socket_path.clone(),
        }],
    };

    let volume = Volume {
        name: settings.socket_volume.clone(),
        host_path: Some(HostPath {
            path: settings.socket_path.clone(),
            kind: "Socket".to_string(),
        }),
    };

    Task {
        api_version: TEKTON_API_VERSION.to_string(),
        kind: "Task".to_string(),
        metadata: Some(Metadata::named(&settings.task_name)),
        spec: Some(TaskSpec {
            workspaces: present(Workspace::mounted(
                &settings.task_workspace,
                &settings.task_mount_path,
            )),
            steps: vec![step],
            volumes: vec![volume],
        }),
    }
}
