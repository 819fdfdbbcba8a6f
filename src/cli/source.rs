//! `fn-export source` - Write a resource stream into a package directory

use anyhow::{Context, Result};
use fn_export::infrastructure::{PackageSummary, ProgressEvent, get_printer, materialize};
use std::io::Read;
use std::path::Path;

/// Materializes `input` into `dir` and reports each written file.
pub fn source_package(
    dir: &Path,
    pattern: &str,
    input: impl Read,
    printer: &str,
) -> Result<PackageSummary> {
    let summary = materialize(dir, pattern, input)
        .with_context(|| format!("Failed to write package: {}", dir.display()))?;

    let mut printer = get_printer(printer, Box::new(std::io::stderr()));
    report(&summary, printer.as_mut())?;
    Ok(summary)
}

fn report(summary: &PackageSummary, printer: &mut dyn fn_export::Printer) -> Result<()> {
    for file in &summary.files {
        printer.print(&ProgressEvent::ResourceWritten {
            path: file.path.display().to_string(),
            resources: file.resources,
        })?;
    }
    printer.print(&ProgressEvent::Completed {
        count: summary.resource_count(),
    })?;
    printer.finish()?;
    Ok(())
}
