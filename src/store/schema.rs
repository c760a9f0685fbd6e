use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::pair_history::HistorySnapshot;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryData {
    pub schema_version: u32,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    pub pairs: HistorySnapshot,
}

impl Default for HistoryData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            updated_at: None,
            pairs: HistorySnapshot::new(),
        }
    }
}

impl HistoryData {
    pub fn new(pairs: HistorySnapshot) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            updated_at: Some(Utc::now()),
            pairs,
        }
    }
}

/// Everything the history file may contain. Older files are a bare
/// `{student: {partner: count}}` map with no envelope.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum HistoryFile {
    Current(HistoryData),
    Legacy(HistorySnapshot),
}

impl HistoryFile {
    pub fn into_data(self) -> HistoryData {
        match self {
            HistoryFile::Current(data) => data,
            HistoryFile::Legacy(pairs) => HistoryData {
                schema_version: 0,
                updated_at: None,
                pairs,
            },
        }
    }
}
