//! Workspace-relative path handling
//!
//! Paths in a [`PipelineConfig`](super::PipelineConfig) are never resolved on
//! the local filesystem. They are joined onto a root chosen by the target
//! engine, which for Tekton is a runtime substitution token.

/// Joins a workspace-relative path onto `root`.
///
/// Repeated separators collapse, `.` segments and trailing slashes vanish,
/// and `..` removes the previous segment without ever climbing above `root`.
/// An empty (or fully collapsed) relative path yields `root` unchanged.
/// A root of `.` means "relative to the current directory" and is only kept
/// when nothing is appended to it.
#[must_use]
pub fn join_workspace_path(root: &str, relative: &str) -> String {
    let segments = clean_segments(relative);

    if segments.is_empty() {
        return root.to_string();
    }

    let tail = segments.join("/");
    if root.is_empty() || root == "." {
        tail
    } else {
        format!("{root}/{tail}")
    }
}

/// Returns true if `relative` uses `..` to leave the workspace root.
#[must_use]
pub fn escapes_workspace(relative: &str) -> bool {
    let mut depth = 0usize;
    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if depth == 0 {
                    return true;
                }
                depth -= 1;
            }
            _ => depth += 1,
        }
    }
    false
}

fn clean_segments(relative: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments
}
