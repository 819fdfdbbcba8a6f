//! `fn-export export` - Generate a pipeline manifest for a CI engine

use anyhow::{Context, Result};
use fn_export::infrastructure::{OrchestratorRegistry, ProgressEvent, get_printer};
use fn_export::{Config, PipelineConfig, Validate};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Flags of the `export` command; unset values come from [`Config`]
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    pub dir: String,
    pub fn_paths: Vec<String>,
    pub workflow: Option<String>,
    pub image: Option<String>,
    pub output: Option<PathBuf>,
    pub printer: Option<String>,
}

impl ExportOptions {
    fn pipeline_config(&self, config: &Config) -> PipelineConfig {
        PipelineConfig::new(self.dir.clone())
            .with_fn_paths(self.fn_paths.iter().cloned())
            .with_image(self.image.as_deref().unwrap_or(&config.default_image))
    }

    fn workflow<'a>(&'a self, config: &'a Config) -> &'a str {
        self.workflow
            .as_deref()
            .unwrap_or(&config.default_orchestrator)
    }
}

/// Generates the manifest described by `options`.
pub fn export_manifest(options: &ExportOptions, config: &Config) -> Result<Vec<u8>> {
    let pipeline = options.pipeline_config(config);
    pipeline.validate().context("Invalid export options")?;

    let workflow = options.workflow(config);
    debug!(workflow, dir = %pipeline.dir, "generating manifest");

    let mut orchestrator = OrchestratorRegistry::with_defaults().create(workflow)?;
    let manifest = orchestrator
        .init(&pipeline)
        .generate()
        .with_context(|| format!("Failed to generate {workflow} manifest"))?;

    Ok(manifest)
}

/// Generates the manifest and writes it to the output file or stdout.
///
/// Progress goes to stderr so a manifest printed to stdout can be piped.
pub fn run_export(options: &ExportOptions, config: &Config) -> Result<()> {
    let manifest = export_manifest(options, config)?;
    let printer = options.printer.as_deref().unwrap_or(&config.printer);
    let mut printer = get_printer(printer, Box::new(std::io::stderr()));

    printer.print(&ProgressEvent::Generated {
        orchestrator: options.workflow(config).to_string(),
        bytes: manifest.len(),
    })?;

    if let Some(output_path) = &options.output {
        save_export(&manifest, output_path)?;
        info!(path = %output_path.display(), "manifest written");
        printer.print(&ProgressEvent::Written {
            path: output_path.display().to_string(),
            bytes: manifest.len(),
        })?;
    } else {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(&manifest)
            .and_then(|()| stdout.flush())
            .context("Failed to write manifest to stdout")?;
    }

    printer.print(&ProgressEvent::Completed { count: 1 })?;
    printer.finish()?;
    Ok(())
}

pub fn save_export(content: &[u8], output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(output_path, content)
        .with_context(|| format!("Failed to write export to: {}", output_path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fn_export::{DEFAULT_IMAGE, ExportError};
    use tempfile::TempDir;

    fn options(dir: &str) -> ExportOptions {
        ExportOptions {
            dir: dir.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_export_defaults_to_tekton() {
        let manifest = export_manifest(&options("resources"), &Config::default()).unwrap();
        let text = String::from_utf8(manifest).unwrap();

        assert!(text.starts_with("apiVersion: tekton.dev/v1beta1\nkind: Task\n"));
        assert!(text.contains(&format!("image: {DEFAULT_IMAGE}")));
        assert!(text.contains("$(workspaces.source.path)/resources"));
    }

    #[test]
    fn test_export_uses_configured_engine_and_image() {
        let config = Config {
            default_orchestrator: "gitlab-ci".to_string(),
            default_image: "example.com/runner:v1".to_string(),
            ..Config::default()
        };
        let text =
            String::from_utf8(export_manifest(&options("app"), &config).unwrap()).unwrap();

        assert!(text.contains("stages:"));
        assert!(text.contains("example.com/runner:v1"));
    }

    #[test]
    fn test_flags_override_config() {
        let opts = ExportOptions {
            workflow: Some("github-actions".to_string()),
            image: Some("custom:1".to_string()),
            fn_paths: vec!["fns".to_string()],
            ..options("app")
        };
        let text =
            String::from_utf8(export_manifest(&opts, &Config::default()).unwrap()).unwrap();

        assert!(text.contains("docker://custom:1"));
        assert!(text.contains("run app --fn-path fns"));
    }

    #[test]
    fn test_unknown_workflow_lists_available() {
        let opts = ExportOptions {
            workflow: Some("jenkins".to_string()),
            ..options("app")
        };
        let err = export_manifest(&opts, &Config::default()).unwrap_err();

        match err.downcast_ref::<ExportError>() {
            Some(ExportError::UnknownOrchestrator { name, available }) => {
                assert_eq!(name, "jenkins");
                assert!(available.contains("tekton"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_escaping_path_is_rejected() {
        let opts = ExportOptions {
            fn_paths: vec!["../outside".to_string()],
            ..options("app")
        };
        let err = export_manifest(&opts, &Config::default()).unwrap_err();
        assert!(format!("{err:#}").contains("Invalid export options"));
    }

    #[test]
    fn test_run_export_writes_output_file() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("nested/pipeline.yaml");
        let opts = ExportOptions {
            output: Some(output.clone()),
            printer: Some("json".to_string()),
            ..options("resources")
        };

        run_export(&opts, &Config::default()).unwrap();

        let written = fs::read(&output).unwrap();
        assert_eq!(
            written,
            export_manifest(&opts, &Config::default()).unwrap()
        );
    }
}
