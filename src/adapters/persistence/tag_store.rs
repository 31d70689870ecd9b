//! JSONL Tag Store - File-backed Monitor Tag Lookup
//!
//! Reads two append-only JSONL files from the data directory:
//! - `tags.jsonl`: tag definitions (`{"id", "name", "color"}`)
//! - `monitor_tags.jsonl`: tag assignments (`{"monitor_id", "tag_id", "value"}`)
//!
//! A lookup joins assignments for one monitor against the definitions.
//! Files are re-read on every lookup, so edits are picked up by the
//! next monitor that is watched.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, instrument, warn};

use crate::domain::monitor::{MonitorId, MonitorTag};
use crate::ports::tag_store::TagStore;

/// A tag definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagDefinition {
    /// Tag identifier.
    pub id: u64,
    /// Tag name, used as the label name.
    pub name: String,
    /// Display colour, unused by the exporter.
    #[serde(default)]
    pub color: Option<String>,
}

/// Assignment of a tag to a monitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorTagRow {
    /// Monitor the tag is attached to.
    pub monitor_id: MonitorId,
    /// Referenced tag definition.
    pub tag_id: u64,
    /// Per-monitor value; `null` and absent both mean empty.
    #[serde(default)]
    pub value: Option<String>,
}

/// File-backed tag store.
pub struct JsonlTagStore {
    /// Directory holding the JSONL files.
    data_dir: PathBuf,
    /// Path to tags.jsonl.
    tags_path: PathBuf,
    /// Path to monitor_tags.jsonl.
    monitor_tags_path: PathBuf,
}

impl JsonlTagStore {
    /// Create a tag store reading from the given data directory.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let dir = data_dir.as_ref();
        Self {
            data_dir: dir.to_path_buf(),
            tags_path: dir.join("tags.jsonl"),
            monitor_tags_path: dir.join("monitor_tags.jsonl"),
        }
    }

    /// Load every well-formed record of a JSONL file.
    ///
    /// A missing file yields no records. Malformed lines are skipped.
    async fn load_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
        if !fs::try_exists(path).await.unwrap_or(false) {
            debug!(file = %path.display(), "Tag file not found");
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let mut records = Vec::new();
        for (line_no, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<T>(line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(
                        file = %path.display(),
                        line = line_no + 1,
                        error = %e,
                        "Skipping malformed tag record"
                    );
                }
            }
        }

        Ok(records)
    }
}

#[async_trait]
impl TagStore for JsonlTagStore {
    #[instrument(skip(self))]
    async fn monitor_tags(&self, monitor_id: MonitorId) -> Result<Vec<MonitorTag>> {
        let rows: Vec<MonitorTagRow> =
            Self::load_records(&self.monitor_tags_path).await?;
        let rows: Vec<MonitorTagRow> = rows
            .into_iter()
            .filter(|row| row.monitor_id == monitor_id)
            .collect();

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let definitions: HashMap<u64, TagDefinition> =
            Self::load_records::<TagDefinition>(&self.tags_path)
                .await?
                .into_iter()
                .map(|tag| (tag.id, tag))
                .collect();

        let mut tags = Vec::with_capacity(rows.len());
        for row in rows {
            match definitions.get(&row.tag_id) {
                Some(tag) => tags.push(MonitorTag::new(
                    tag.name.clone(),
                    row.value.unwrap_or_default(),
                )),
                None => warn!(
                    tag_id = row.tag_id,
                    "Tag assignment references unknown tag"
                ),
            }
        }

        debug!(count = tags.len(), "Loaded monitor tags");
        Ok(tags)
    }

    async fn is_healthy(&self) -> bool {
        fs::metadata(&self.data_dir)
            .await
            .is_ok_and(|meta| meta.is_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_store(name: &str, tags: &str, assignments: &str) -> JsonlTagStore {
        let dir = std::env::temp_dir().join(format!(
            "monitor-metrics-tags-{name}-{}",
            std::process::id()
        ));
        fs::create_dir_all(&dir).await.unwrap();
        fs::write(dir.join("tags.jsonl"), tags).await.unwrap();
        fs::write(dir.join("monitor_tags.jsonl"), assignments)
            .await
            .unwrap();
        JsonlTagStore::new(dir)
    }

    #[tokio::test]
    async fn test_joins_assignments_with_definitions() {
        let store = temp_store(
            "join",
            concat!(
                r##"{"id": 1, "name": "region", "color": "#fff"}"##,
                "\n",
                r#"{"id": 2, "name": "team"}"#,
                "\n",
            ),
            concat!(
                r#"{"monitor_id": 10, "tag_id": 1, "value": "eu-west-1"}"#,
                "\n",
                r#"{"monitor_id": 11, "tag_id": 1, "value": "us-east-1"}"#,
                "\n",
                r#"{"monitor_id": 10, "tag_id": 2, "value": null}"#,
                "\n",
            ),
        )
        .await;

        let tags = store.monitor_tags(10).await.unwrap();
        assert_eq!(
            tags,
            vec![
                MonitorTag::new("region", "eu-west-1"),
                MonitorTag::new("team", ""),
            ]
        );
        assert!(store.is_healthy().await);
    }

    #[tokio::test]
    async fn test_skips_malformed_and_dangling_rows() {
        let store = temp_store(
            "malformed",
            "{\"id\": 1, \"name\": \"rack\"}\nnot json\n",
            concat!(
                r#"{"monitor_id": 5, "tag_id": 1, "value": "r12"}"#,
                "\n",
                r#"{"monitor_id": 5, "tag_id": 99, "value": "x"}"#,
                "\n",
                "{broken\n",
            ),
        )
        .await;

        let tags = store.monitor_tags(5).await.unwrap();
        assert_eq!(tags, vec![MonitorTag::new("rack", "r12")]);
    }

    #[tokio::test]
    async fn test_missing_files_mean_no_tags() {
        let store = JsonlTagStore::new(std::env::temp_dir().join("monitor-metrics-none"));
        assert!(store.monitor_tags(1).await.unwrap().is_empty());
    }
}
