//! `fn-export completions` - Generate shell completions

use anyhow::{Context, Result};
use clap_complete::Shell;
use std::fs;
use std::path::Path;

pub fn generate_completions(shell: Shell) -> Result<String> {
    use clap_complete::generate;

    let mut cmd = super::build_cli();
    let mut buf = Vec::new();
    generate(shell, &mut cmd, "fn-export", &mut buf);

    String::from_utf8(buf).context("Failed to generate completions")
}

pub fn save_completions(completions: &str, output_path: &Path) -> Result<()> {
    fs::write(output_path, completions)
        .with_context(|| format!("Failed to write completions to: {}", output_path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_bash_completions() {
        let completions = generate_completions(Shell::Bash).unwrap();
        assert!(completions.contains("fn-export"));
        assert!(completions.contains("--fn-path"));
    }

    #[test]
    fn test_generate_fish_completions() {
        let completions = generate_completions(Shell::Fish).unwrap();
        assert!(completions.contains("export"));
        assert!(completions.contains("source"));
    }

    #[test]
    fn test_save_completions() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("fn-export.bash");
        save_completions("complete", &path).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "complete");
    }
}
