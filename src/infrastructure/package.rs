//! Resource stream materialization
//!
//! Reads a stream of YAML resources and writes them into a package
//! directory, one file per generated file name, together with a `Pkgfile`
//! recording where the package came from.

use crate::pipeline::{ExportError, ExportResult, ManifestDocuments, escapes_workspace};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// File name pattern used when the caller does not pick one
pub const DEFAULT_FILENAME_PATTERN: &str = "%n_%k.yaml";

/// Name of the provenance file written at the package root
pub const PACKAGE_FILE_NAME: &str = "Pkgfile";

/// Upstream type recorded for packages read from a stream
pub const STDIN_ORIGIN: &str = "stdin";

static PATTERN_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new("%[nk]").expect("valid regex"));

/// Provenance file of a materialized package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageFile {
    /// Always `Pkgfile`
    pub kind: String,
    /// Package metadata
    pub metadata: PackageMetadata,
    /// Where the package came from
    pub upstream: Upstream,
}

/// Package metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMetadata {
    /// Package name (base name of the directory)
    pub name: String,
}

/// Package origin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upstream {
    /// Origin type
    #[serde(rename = "type")]
    pub kind: String,
    /// Stream origin details
    pub stdin: StdinOrigin,
}

/// Details of a package read from a stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StdinOrigin {
    /// Pattern used to name the resource files
    pub filename_pattern: String,
    /// The input exactly as it was read
    pub original: String,
}

/// A file written by [`materialize`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    /// Path of the file
    pub path: PathBuf,
    /// Number of resources stored in it
    pub resources: usize,
}

/// Outcome of [`materialize`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSummary {
    /// Package directory
    pub dir: PathBuf,
    /// Resource files in the order they were first named
    pub files: Vec<WrittenFile>,
    /// Path of the provenance file
    pub package_file: PathBuf,
}

impl PackageSummary {
    /// Total number of resources written
    #[must_use]
    pub fn resource_count(&self) -> usize {
        self.files.iter().map(|f| f.resources).sum()
    }
}

#[derive(Debug, Clone)]
struct Resource {
    kind: String,
    name: String,
    value: Value,
}

/// Writes every resource read from `input` into `dir`.
///
/// Each resource is stored in the file named by `pattern` (`%n` is the
/// lowercased resource name, `%k` the lowercased kind). Resources that map
/// to the same file share it as a multi-document stream. `kind: List`
/// documents are unwrapped into their items.
///
/// # Errors
/// Returns `ExportError::Parse` for malformed input or a pattern that
/// names a file outside `dir`, and `ExportError::Io` if writing fails.
/// Nothing is written when the input cannot be parsed.
pub fn materialize(dir: &Path, pattern: &str, mut input: impl Read) -> ExportResult<PackageSummary> {
    let mut original = String::new();
    input.read_to_string(&mut original).map_err(|e| match e.kind() {
        std::io::ErrorKind::InvalidData => ExportError::Parse(format!("input: {e}")),
        _ => ExportError::from(e),
    })?;

    let resources = parse_resources(&original)?;

    let mut grouped: Vec<(String, ManifestDocuments)> = Vec::new();
    for resource in &resources {
        let file_name = resource_file_name(pattern, resource)?;
        let index = match grouped.iter().position(|(name, _)| *name == file_name) {
            Some(index) => index,
            None => {
                grouped.push((file_name, ManifestDocuments::new()));
                grouped.len() - 1
            }
        };
        grouped[index].1.push_serialized(&resource.value)?;
    }

    create_dir(dir)?;

    let mut files = Vec::with_capacity(grouped.len());
    for (file_name, documents) in grouped {
        let path = dir.join(&file_name);
        if let Some(parent) = path.parent() {
            create_dir(parent)?;
        }
        write_file(&path, &documents.join())?;
        tracing::debug!(path = %path.display(), resources = documents.len(), "Wrote resource file");
        files.push(WrittenFile {
            path,
            resources: documents.len(),
        });
    }

    let package = PackageFile {
        kind: PACKAGE_FILE_NAME.to_string(),
        metadata: PackageMetadata {
            name: package_name(dir),
        },
        upstream: Upstream {
            kind: STDIN_ORIGIN.to_string(),
            stdin: StdinOrigin {
                filename_pattern: pattern.to_string(),
                original,
            },
        },
    };
    let package_file = dir.join(PACKAGE_FILE_NAME);
    write_file(&package_file, &serde_yaml::to_string(&package)?)?;

    tracing::info!(
        dir = %dir.display(),
        files = files.len(),
        "Materialized package"
    );

    Ok(PackageSummary {
        dir: dir.to_path_buf(),
        files,
        package_file,
    })
}

/// Reads the provenance file of a materialized package.
///
/// # Errors
/// Returns `ExportError::Io` if the file cannot be read and
/// `ExportError::Parse` if it is not a valid package file.
pub fn read_package_file(dir: &Path) -> ExportResult<PackageFile> {
    let path = dir.join(PACKAGE_FILE_NAME);
    let content = fs::read_to_string(&path)
        .map_err(|e| ExportError::Io(format!("{}: {e}", path.display())))?;
    serde_yaml::from_str(&content).map_err(|e| ExportError::Parse(e.to_string()))
}

fn parse_resources(text: &str) -> ExportResult<Vec<Resource>> {
    let mut resources = Vec::new();

    for document in serde_yaml::Deserializer::from_str(text) {
        let value = Value::deserialize(document).map_err(|e| ExportError::Parse(e.to_string()))?;
        if value.is_null() {
            continue;
        }

        if value.get("kind").and_then(Value::as_str) == Some("List") {
            let items = value
                .get("items")
                .and_then(Value::as_sequence)
                .cloned()
                .unwrap_or_default();
            for item in items {
                resources.push(to_resource(item, resources.len())?);
            }
        } else {
            resources.push(to_resource(value, resources.len())?);
        }
    }

    Ok(resources)
}

fn to_resource(value: Value, index: usize) -> ExportResult<Resource> {
    let kind = value
        .get("kind")
        .and_then(Value::as_str)
        .ok_or_else(|| ExportError::Parse(format!("resource {index} has no kind")))?
        .to_string();
    let name = value
        .get("metadata")
        .and_then(|metadata| metadata.get("name"))
        .and_then(Value::as_str)
        .ok_or_else(|| ExportError::Parse(format!("resource {index} ({kind}) has no metadata.name")))?
        .to_string();

    Ok(Resource { kind, name, value })
}

fn resource_file_name(pattern: &str, resource: &Resource) -> ExportResult<String> {
    let file_name = PATTERN_TOKEN
        .replace_all(pattern, |caps: &Captures<'_>| match &caps[0] {
            "%n" => resource.name.to_lowercase(),
            _ => resource.kind.to_lowercase(),
        })
        .into_owned();

    if file_name.trim_matches('/').is_empty()
        || file_name.starts_with('/')
        || escapes_workspace(&file_name)
    {
        return Err(ExportError::Parse(format!(
            "pattern '{pattern}' yields invalid file name '{file_name}' for {}/{}",
            resource.kind, resource.name
        )));
    }

    Ok(file_name)
}

fn package_name(dir: &Path) -> String {
    dir.file_name()
        .map_or_else(|| ".".to_string(), |name| name.to_string_lossy().into_owned())
}

fn create_dir(dir: &Path) -> ExportResult<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder
        .create(dir)
        .map_err(|e| ExportError::Io(format!("{}: {e}", dir.display())))
}

fn write_file(path: &Path, contents: &str) -> ExportResult<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options
        .open(path)
        .map_err(|e| ExportError::Io(format!("{}: {e}", path.display())))?;
    file.write_all(contents.as_bytes())
        .map_err(|e| ExportError::Io(format!("{}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const INPUT: &str = "\
apiVersion: v1
kind: ConfigMap
metadata:
  name: App-Config
data:
  key: value
---
apiVersion: apps/v1
kind: Deployment
metadata:
  name: app
spec:
  replicas: 1
";

    fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_materialize_default_pattern() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("my-package");

        let summary = materialize(&dir, DEFAULT_FILENAME_PATTERN, INPUT.as_bytes()).unwrap();

        assert_eq!(summary.files.len(), 2);
        assert_eq!(summary.resource_count(), 2);
        assert_eq!(summary.files[0].path, dir.join("app-config_configmap.yaml"));
        assert_eq!(summary.files[1].path, dir.join("app_deployment.yaml"));

        let config_map: Value = serde_yaml::from_str(&read(&summary.files[0].path)).unwrap();
        assert_eq!(config_map["data"]["key"].as_str(), Some("value"));
        assert_eq!(config_map["metadata"]["name"].as_str(), Some("App-Config"));
    }

    #[test]
    fn test_package_file_records_origin() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("my-package");

        let summary = materialize(&dir, "%k.yaml", INPUT.as_bytes()).unwrap();
        assert_eq!(summary.package_file, dir.join(PACKAGE_FILE_NAME));

        let package = read_package_file(&dir).unwrap();
        assert_eq!(package.kind, "Pkgfile");
        assert_eq!(package.metadata.name, "my-package");
        assert_eq!(package.upstream.kind, STDIN_ORIGIN);
        assert_eq!(package.upstream.stdin.filename_pattern, "%k.yaml");
        assert_eq!(package.upstream.stdin.original, INPUT);
    }

    #[test]
    fn test_shared_file_name_groups_documents() {
        let temp = TempDir::new().unwrap();
        let input = "\
kind: ConfigMap
metadata:
  name: a
---
kind: ConfigMap
metadata:
  name: b
";

        let summary = materialize(temp.path(), "%k.yaml", input.as_bytes()).unwrap();
        assert_eq!(summary.files.len(), 1);
        assert_eq!(summary.files[0].resources, 2);

        let content = read(&summary.files[0].path);
        assert_eq!(content.lines().filter(|line| *line == "---").count(), 1);
        let first_a = content.find("name: a").unwrap();
        let then_b = content.find("name: b").unwrap();
        assert!(first_a < then_b);
    }

    #[test]
    fn test_list_items_are_unwrapped() {
        let temp = TempDir::new().unwrap();
        let input = "\
apiVersion: v1
kind: List
items:
- kind: Service
  metadata:
    name: web
- kind: Service
  metadata:
    name: db
";

        let summary = materialize(temp.path(), DEFAULT_FILENAME_PATTERN, input.as_bytes()).unwrap();
        let names: Vec<_> = summary
            .files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["web_service.yaml", "db_service.yaml"]);
    }

    #[test]
    fn test_pattern_with_subdirectory() {
        let temp = TempDir::new().unwrap();
        let summary = materialize(temp.path(), "%k/%n.yaml", INPUT.as_bytes()).unwrap();

        assert!(temp.path().join("configmap/app-config.yaml").is_file());
        assert!(temp.path().join("deployment/app.yaml").is_file());
        assert_eq!(summary.files.len(), 2);
    }

    #[test]
    fn test_empty_documents_are_skipped() {
        let temp = TempDir::new().unwrap();
        let input = "---\nkind: Secret\nmetadata:\n  name: token\n---\n";

        let summary = materialize(temp.path(), DEFAULT_FILENAME_PATTERN, input.as_bytes()).unwrap();
        assert_eq!(summary.resource_count(), 1);
    }

    #[test]
    fn test_missing_kind_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("out");
        let input = "metadata:\n  name: orphan\n";

        let err = materialize(&dir, DEFAULT_FILENAME_PATTERN, input.as_bytes()).unwrap_err();
        assert!(matches!(err, ExportError::Parse(ref msg) if msg.contains("no kind")));
        assert!(!dir.exists());
    }

    #[test]
    fn test_missing_name_is_rejected() {
        let temp = TempDir::new().unwrap();
        let err = materialize(temp.path(), DEFAULT_FILENAME_PATTERN, "kind: Pod\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, ExportError::Parse(ref msg) if msg.contains("metadata.name")));
    }

    #[test]
    fn test_pattern_cannot_escape_directory() {
        let temp = TempDir::new().unwrap();
        let err = materialize(temp.path(), "../%n.yaml", INPUT.as_bytes()).unwrap_err();
        assert!(matches!(err, ExportError::Parse(_)));
    }

    #[test]
    fn test_non_utf8_input_is_rejected() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("pkg");
        let input: &[u8] = b"kind: ConfigMap\nmetadata:\n  name: \xff\xfe\n";

        let err = materialize(&dir, DEFAULT_FILENAME_PATTERN, input).unwrap_err();
        assert!(matches!(err, ExportError::Parse(_)));
        assert!(!dir.exists());
    }

    #[test]
    fn test_invalid_yaml_is_rejected() {
        let temp = TempDir::new().unwrap();
        let err = materialize(temp.path(), DEFAULT_FILENAME_PATTERN, "kind: [".as_bytes())
            .unwrap_err();
        assert!(matches!(err, ExportError::Parse(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_files_are_private() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("private");
        let summary = materialize(&dir, DEFAULT_FILENAME_PATTERN, INPUT.as_bytes()).unwrap();

        let mode = fs::metadata(&summary.files[0].path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        let mode = fs::metadata(&dir).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
    }
}
