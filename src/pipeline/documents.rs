//! Multi-document assembly
//!
//! Engines that need several objects registered together (a Tekton `Task`
//! next to the `Pipeline` that references it) serialize each object on its
//! own and hand the blocks to [`ManifestDocuments`], which owns the ordering
//! and separator rules.

use super::errors::ExportResult;
use serde::Serialize;

/// YAML document separator line
pub const DOCUMENT_SEPARATOR: &str = "---\n";

/// An ordered list of serialized YAML documents.
///
/// Blocks are emitted in push order. [`join`](Self::join) places exactly one
/// separator between consecutive blocks and none before the first or after
/// the last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestDocuments {
    blocks: Vec<String>,
}

impl ManifestDocuments {
    /// Creates an empty document list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes `node` as YAML and appends it as the next document.
    ///
    /// # Errors
    /// Returns `ExportError::Serialization` if serde_yaml rejects the node.
    pub fn push_serialized<T: Serialize>(&mut self, node: &T) -> ExportResult<()> {
        let block = serde_yaml::to_string(node)?;
        self.push(block);
        Ok(())
    }

    /// Appends an already serialized document.
    pub fn push(&mut self, block: impl Into<String>) {
        let mut block = block.into();
        // An explicit document start would double up with the joiner.
        if let Some(rest) = block.strip_prefix(DOCUMENT_SEPARATOR) {
            block = rest.to_string();
        }
        if !block.is_empty() && !block.ends_with('\n') {
            block.push('\n');
        }
        self.blocks.push(block);
    }

    /// Returns the serialized blocks in emission order.
    #[must_use]
    pub fn blocks(&self) -> &[String] {
        &self.blocks
    }

    /// Number of documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns true if no document was pushed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Concatenates all documents into one multi-document stream.
    #[must_use]
    pub fn join(&self) -> String {
        self.blocks.join(DOCUMENT_SEPARATOR)
    }

    /// Concatenates all documents and returns the bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.join().into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separator_count(out: &str) -> usize {
        out.lines().filter(|line| *line == "---").count()
    }

    #[test]
    fn test_empty_joins_to_nothing() {
        assert_eq!(ManifestDocuments::new().join(), "");
    }

    #[test]
    fn test_single_document_has_no_separator() {
        let mut docs = ManifestDocuments::new();
        docs.push("kind: Task\n");
        assert_eq!(docs.join(), "kind: Task\n");
    }

    #[test]
    fn test_separator_only_between_documents() {
        let mut docs = ManifestDocuments::new();
        docs.push("kind: Task\n");
        docs.push("kind: Pipeline\n");
        docs.push("kind: PipelineRun");

        let out = docs.join();
        assert_eq!(
            out,
            "kind: Task\n---\nkind: Pipeline\n---\nkind: PipelineRun\n"
        );
        assert_eq!(separator_count(&out), 2);
        assert!(!out.starts_with("---"));
    }

    #[test]
    fn test_explicit_document_start_is_dropped() {
        let mut docs = ManifestDocuments::new();
        docs.push("---\nkind: Task\n");
        docs.push("kind: Pipeline\n");
        assert_eq!(separator_count(&docs.join()), 1);
    }

    #[test]
    fn test_push_serialized_preserves_order() {
        #[derive(Serialize)]
        struct Named {
            name: &'static str,
        }

        let mut docs = ManifestDocuments::new();
        docs.push_serialized(&Named { name: "first" }).unwrap();
        docs.push_serialized(&Named { name: "second" }).unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs.join(), "name: first\n---\nname: second\n");
    }
}
