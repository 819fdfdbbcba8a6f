//! Tekton Manifest Schema Types
//!
//! Serializable shapes of the Tekton objects the exporter emits.
//! See: <https://tekton.dev/docs/pipelines/pipelines/> and
//! <https://tekton.dev/docs/pipelines/tasks/>
//!
//! Empty strings, empty sequences and absent sub-objects are left out of the
//! output entirely, matching how Tekton manifests are written by hand.

use serde::Serialize;

/// A Tekton `Pipeline` object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pipeline {
    /// API group and version
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_version: String,

    /// Object kind
    #[serde(skip_serializing_if = "String::is_empty")]
    pub kind: String,

    /// Object metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,

    /// Pipeline spec
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec: Option<PipelineSpec>,
}

/// The spec of a `Pipeline`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineSpec {
    /// Workspace slots the pipeline expects to be bound at run time
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub workspaces: Vec<Workspace>,

    /// Tasks run by the pipeline
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<PipelineTask>,
}

/// An entry in `Pipeline.spec.tasks`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineTask {
    /// Name of the entry within the pipeline
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// The `Task` object this entry runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_ref: Option<TaskRef>,

    /// Entries that must finish before this one starts
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub run_after: Vec<String>,

    /// Task workspaces bound to pipeline workspaces
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub workspaces: Vec<Workspace>,
}

/// Reference to a `Task` by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskRef {
    /// Referenced task name
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
}

/// Object metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metadata {
    /// Object name
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
}

impl Metadata {
    /// Metadata carrying only a name
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A workspace declaration or binding.
///
/// Owned by a task, a workspace declares where it is mounted. Inside a
/// pipeline task it instead names the pipeline workspace it is bound to.
/// [`WorkspaceBinding`] makes the two mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Workspace {
    /// Workspace name
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Mount point or referenced workspace
    #[serde(flatten, skip_serializing_if = "binding_is_empty")]
    pub binding: Option<WorkspaceBinding>,
}

fn binding_is_empty(binding: &Option<WorkspaceBinding>) -> bool {
    binding.as_ref().is_none_or(WorkspaceBinding::is_empty)
}

impl Workspace {
    /// A workspace slot with no mount point (pipeline scope)
    pub fn declared(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            binding: None,
        }
    }

    /// A task-owned workspace mounted at `mount_path`
    pub fn mounted(name: impl Into<String>, mount_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            binding: Some(WorkspaceBinding::MountPath(mount_path.into()))
                .filter(|b| !b.is_empty()),
        }
    }

    /// A task workspace bound to the pipeline workspace `workspace`
    pub fn bound(name: impl Into<String>, workspace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            binding: Some(WorkspaceBinding::Workspace(workspace.into()))
                .filter(|b| !b.is_empty()),
        }
    }

    /// True when neither a name nor a binding would be serialized
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && binding_is_empty(&self.binding)
    }
}

/// How a [`Workspace`] is attached
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WorkspaceBinding {
    /// Path the workspace is mounted at inside the task's steps
    MountPath(String),
    /// Name of a workspace declared elsewhere
    Workspace(String),
}

impl WorkspaceBinding {
    /// True when the mount path or referenced name is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::MountPath(value) | Self::Workspace(value) => value.is_empty(),
        }
    }
}

/// A Tekton `Task` object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// API group and version
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_version: String,

    /// Object kind
    #[serde(skip_serializing_if = "String::is_empty")]
    pub kind: String,

    /// Object metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,

    /// Task spec
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec: Option<TaskSpec>,
}

/// The spec of a `Task`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskSpec {
    /// Workspaces the task mounts
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub workspaces: Vec<Workspace>,

    /// Steps run in order inside the task pod
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<Step>,

    /// Volumes available to the steps
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<Volume>,
}

/// A container step of a `Task`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// Step name
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Container image
    #[serde(skip_serializing_if = "String::is_empty")]
    pub image: String,

    /// Container arguments
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    /// Volumes mounted into the container
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volume_mounts: Vec<VolumeMount>,
}

/// Mounts a volume into a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeMount {
    /// Name of the volume
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Path inside the container
    #[serde(skip_serializing_if = "String::is_empty")]
    pub mount_path: String,
}

/// A volume declared by a `Task`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    /// Volume name
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Host path backing the volume
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_path: Option<HostPath>,
}

/// A file or directory on the node running the task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostPath {
    /// Path on the host
    #[serde(skip_serializing_if = "String::is_empty")]
    pub path: String,

    /// Expected file type (e.g. `Socket`)
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub kind: String,
}
