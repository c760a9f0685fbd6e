use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::store::write_atomic;

/// Markdown file of every listing produced so far, newest at the top.
pub struct GroupsLog {
    path: PathBuf,
}

impl GroupsLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn prepend(&self, listing: &str) -> Result<()> {
        let existing = if self.path.exists() {
            fs::read_to_string(&self.path)
                .with_context(|| format!("Failed to read groups log {}", self.path.display()))?
        } else {
            String::new()
        };
        let content = format!("{listing}{existing}");
        write_atomic(&self.path, content.as_bytes())
            .with_context(|| format!("Failed to write groups log {}", self.path.display()))?;
        tracing::info!(path = %self.path.display(), "stored groups");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_newest_listing_first() {
        let dir = TempDir::new().unwrap();
        let log = GroupsLog::new(dir.path().join("groups.md"));
        log.prepend("# first #\n\n").unwrap();
        log.prepend("# second #\n\n").unwrap();
        let content = fs::read_to_string(log.path()).unwrap();
        assert_eq!(content, "# second #\n\n# first #\n\n");
    }
}
