//! Progress printers
//!
//! Reports what the CLI generated and wrote. The printer is picked by name;
//! unknown names fall back to the line-per-event printer.

use crate::pipeline::{ExportError, ExportResult};
use serde::Serialize;
use std::fmt;
use std::io::Write;

/// One line per event, written as it happens
pub const EVENTS_PRINTER: &str = "events";
/// Aligned table written when the run finishes
pub const TABLE_PRINTER: &str = "table";
/// One JSON object per line
pub const JSON_PRINTER: &str = "json";

/// Something the CLI did that is worth reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ProgressEvent {
    /// A manifest was generated
    Generated {
        /// Engine that produced it
        orchestrator: String,
        /// Manifest size
        bytes: usize,
    },
    /// A manifest was written to a file
    Written {
        /// Destination
        path: String,
        /// Bytes written
        bytes: usize,
    },
    /// A resource file was written into a package
    ResourceWritten {
        /// Destination
        path: String,
        /// Number of resources in the file
        resources: usize,
    },
    /// The command finished
    Completed {
        /// Number of items produced
        count: usize,
    },
}

impl ProgressEvent {
    fn columns(&self) -> [String; 3] {
        match self {
            Self::Generated {
                orchestrator,
                bytes,
            } => [
                "generated".to_string(),
                orchestrator.clone(),
                format!("{bytes} bytes"),
            ],
            Self::Written { path, bytes } => {
                ["written".to_string(), path.clone(), format!("{bytes} bytes")]
            }
            Self::ResourceWritten { path, resources } => [
                "written".to_string(),
                path.clone(),
                format!("{resources} resources"),
            ],
            Self::Completed { count } => {
                ["completed".to_string(), String::new(), format!("{count} items")]
            }
        }
    }
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generated {
                orchestrator,
                bytes,
            } => write!(f, "{orchestrator} manifest generated ({bytes} bytes)"),
            Self::Written { path, bytes } => write!(f, "{path} written ({bytes} bytes)"),
            Self::ResourceWritten { path, resources } => {
                write!(f, "{path} written ({resources} resources)")
            }
            Self::Completed { count } => write!(f, "completed: {count} items"),
        }
    }
}

/// Reports progress events to a sink
#[allow(clippy::missing_errors_doc)]
pub trait Printer {
    /// Reports one event
    fn print(&mut self, event: &ProgressEvent) -> ExportResult<()>;

    /// Flushes anything buffered
    fn finish(&mut self) -> ExportResult<()> {
        Ok(())
    }
}

/// Returns the printer registered as `kind`, falling back to the events
/// printer for unknown names.
#[must_use]
pub fn get_printer<'a>(kind: &str, sink: Box<dyn Write + 'a>) -> Box<dyn Printer + 'a> {
    match kind {
        TABLE_PRINTER => Box::new(TablePrinter {
            out: sink,
            rows: Vec::new(),
        }),
        JSON_PRINTER => Box::new(JsonPrinter { out: sink }),
        _ => Box::new(EventsPrinter { out: sink }),
    }
}

/// Names accepted by [`get_printer`]
#[must_use]
pub fn supported_printers() -> Vec<&'static str> {
    vec![EVENTS_PRINTER, TABLE_PRINTER, JSON_PRINTER]
}

/// Printer used when none is requested
#[must_use]
pub fn default_printer() -> &'static str {
    EVENTS_PRINTER
}

struct EventsPrinter<'a> {
    out: Box<dyn Write + 'a>,
}

impl Printer for EventsPrinter<'_> {
    fn print(&mut self, event: &ProgressEvent) -> ExportResult<()> {
        writeln!(self.out, "{event}")?;
        self.out.flush()?;
        Ok(())
    }
}

struct JsonPrinter<'a> {
    out: Box<dyn Write + 'a>,
}

impl Printer for JsonPrinter<'_> {
    fn print(&mut self, event: &ProgressEvent) -> ExportResult<()> {
        let line =
            serde_json::to_string(event).map_err(|e| ExportError::Serialization(e.to_string()))?;
        writeln!(self.out, "{line}")?;
        Ok(())
    }

    fn finish(&mut self) -> ExportResult<()> {
        self.out.flush()?;
        Ok(())
    }
}

struct TablePrinter<'a> {
    out: Box<dyn Write + 'a>,
    rows: Vec<[String; 3]>,
}

impl Printer for TablePrinter<'_> {
    fn print(&mut self, event: &ProgressEvent) -> ExportResult<()> {
        self.rows.push(event.columns());
        Ok(())
    }

    fn finish(&mut self) -> ExportResult<()> {
        let header = ["EVENT".to_string(), "NAME".to_string(), "DETAIL".to_string()];
        let rows: Vec<&[String; 3]> = std::iter::once(&header).chain(&self.rows).collect();

        let mut widths = [0usize; 3];
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row.iter()) {
                *width = (*width).max(cell.len());
            }
        }

        for row in rows {
            let line = format!(
                "{:<w0$}  {:<w1$}  {}",
                row[0],
                row[1],
                row[2],
                w0 = widths[0],
                w1 = widths[1],
            );
            writeln!(self.out, "{}", line.trim_end())?;
        }
        self.rows.clear();
        self.out.flush()?;
        Ok(())
    }
}
