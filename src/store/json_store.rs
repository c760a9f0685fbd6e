use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::engine::pair_history::HistorySnapshot;
use crate::store::schema::{HistoryData, HistoryFile, SCHEMA_VERSION};
use crate::store::write_atomic;

/// Pairing history kept as a single JSON document.
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `None` when no history has been saved yet. A file that exists but
    /// cannot be parsed is an error rather than an empty history, so a
    /// corrupt file is never silently overwritten.
    pub fn load(&self) -> Result<Option<HistoryData>> {
        if !self.path.exists() {
            tracing::info!(
                path = %self.path.display(),
                "no pairing history yet, starting from zero"
            );
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read history {}", self.path.display()))?;
        let file: HistoryFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse history {}", self.path.display()))?;
        let data = file.into_data();
        if data.schema_version > SCHEMA_VERSION {
            bail!(
                "Unsupported history version: {} (expected at most {})",
                data.schema_version,
                SCHEMA_VERSION
            );
        }
        tracing::info!(
            path = %self.path.display(),
            students = data.pairs.len(),
            "loaded pairing history"
        );
        Ok(Some(data))
    }

    pub fn load_pairs(&self) -> Result<Option<HistorySnapshot>> {
        Ok(self.load()?.map(|data| data.pairs))
    }

    /// Written to a temp file first and renamed into place.
    pub fn save(&self, pairs: &HistorySnapshot) -> Result<()> {
        let data = HistoryData::new(pairs.clone());
        let json = serde_json::to_string_pretty(&data)?;
        write_atomic(&self.path, json.as_bytes())
            .with_context(|| format!("Failed to save history {}", self.path.display()))?;
        tracing::info!(path = %self.path.display(), "saved pairing history");
        Ok(())
    }
}
