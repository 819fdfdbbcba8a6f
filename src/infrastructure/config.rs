//! Configuration management

use crate::pipeline::{DEFAULT_IMAGE, ExportError, ExportResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration
///
/// Every key is optional in a configuration file; missing keys keep their
/// default value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Engine used when `--workflow` is not given
    pub default_orchestrator: String,
    /// Image used when `--image` is not given
    pub default_image: String,
    /// Progress printer
    pub printer: String,
    /// Log level
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_orchestrator: "tekton".to_string(),
            default_image: DEFAULT_IMAGE.to_string(),
            printer: "events".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from a YAML file, or the defaults when no path is
    /// given.
    ///
    /// # Errors
    /// Returns `ExportError::Io` if the file cannot be read and
    /// `ExportError::Parse` if it is not valid YAML.
    pub fn load(path: Option<&Path>) -> ExportResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(path)
            .map_err(|e| ExportError::Io(format!("{}: {e}", path.display())))?;
        Self::from_yaml(&content)
    }

    /// Parses configuration from YAML text.
    ///
    /// # Errors
    /// Returns `ExportError::Parse` if the text is not valid YAML.
    pub fn from_yaml(content: &str) -> ExportResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| ExportError::Parse(e.to_string()))
    }
}
