//! Step summary channel

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::OutputError;

/// Append Markdown to the step summary file, followed by a newline
pub fn append_summary(path: &Path, markdown: &str) -> Result<(), OutputError> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(markdown.as_bytes())?;
    file.write_all(b"\n")?;
    file.flush()?;
    tracing::debug!(path = %path.display(), bytes = markdown.len(), "appended step summary");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_append_summary() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("summary.md");

        append_summary(&path, "# First").unwrap();
        append_summary(&path, "| a | b |").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "# First\n| a | b |\n");
    }
}
