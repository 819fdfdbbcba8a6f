//! fn-export - export configuration-function runs as CI pipeline manifests
//!
//! Describes "run this function image against a directory" once and writes
//! the native pipeline definition for the chosen CI engine.
//!
//! ## Commands
//!
//! - `fn-export export` - Generate a pipeline manifest for a CI engine
//! - `fn-export source` - Write a resource stream read from stdin into a package
//! - `fn-export completions` - Generate shell completions
//!
//! ## Quick Start
//!
//! ```bash
//! # Tekton Task + Pipeline running functions against ./resources
//! fn-export export resources --fn-path functions -o pipeline.yaml
//!
//! # The same run as a GitHub Actions workflow
//! fn-export export resources --workflow github-actions -o .github/workflows/main.yaml
//!
//! # Materialize resources piped from another tool
//! kustomize build overlay | fn-export source ./rendered
//!
//! # Generate shell completions
//! fn-export completions bash > /etc/bash_completion.d/fn-export
//! ```

use std::process::ExitCode;

mod cli;

fn main() -> ExitCode {
    if std::env::var("FN_EXPORT_DEBUG").is_ok() {
        fn_export::init_logging("debug");
    }

    match cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            if std::env::var("FN_EXPORT_VERBOSE").is_ok() {
                eprintln!("{e:?}");
            }
            ExitCode::FAILURE
        }
    }
}
