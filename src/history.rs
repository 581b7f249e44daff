//! Generation history: every repurposing run is recorded for re-display.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::repurpose::{OutputType, RepurposeOutput};

/// The request half of a history entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryInput {
    pub content: String,
    pub output_type: OutputType,
    pub language: String,
}

/// One recorded generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub input: HistoryInput,
    pub output: RepurposeOutput,
}

/// Persists history items as one JSON file per entry with an in-memory
/// cache for listing and lookup.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    history_dir: PathBuf,
    cache: Arc<RwLock<HashMap<String, HistoryItem>>>,
}

impl HistoryStore {
    /// Open (or create) a history directory and load existing entries.
    pub async fn new(history_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&history_dir).await?;

        let store = Self {
            history_dir,
            cache: Arc::new(RwLock::new(HashMap::new())),
        };
        store.load_existing_items().await?;

        let cached = store.cache.read().await.len();
        info!("📚 History store initialized with {} entries", cached);

        Ok(store)
    }

    async fn load_existing_items(&self) -> Result<()> {
        let mut entries = fs::read_dir(&self.history_dir).await?;
        let mut loaded = 0;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                match self.load_item_file(&path).await {
                    Ok(item) => {
                        self.cache.write().await.insert(item.id.clone(), item);
                        loaded += 1;
                    }
                    Err(e) => {
                        warn!("Failed to load history file {}: {}", path.display(), e);
                    }
                }
            }
        }

        debug!("📁 Loaded {} history files from disk", loaded);
        Ok(())
    }

    async fn load_item_file(&self, path: &Path) -> Result<HistoryItem> {
        let content = fs::read_to_string(path).await?;
        let item: HistoryItem = serde_json::from_str(&content)?;
        Ok(item)
    }

    fn item_path(&self, id: &str) -> PathBuf {
        self.history_dir.join(format!("{}.json", id))
    }

    /// Record a generation and persist it to disk.
    pub async fn record(&self, input: HistoryInput, output: RepurposeOutput) -> Result<HistoryItem> {
        let timestamp = Utc::now();
        let id = format!(
            "{:x}",
            md5::compute(format!("{}{}", input.content, timestamp.timestamp_nanos_opt().unwrap_or_default()))
        );

        let item = HistoryItem {
            id: id.clone(),
            timestamp,
            input,
            output,
        };

        let json = serde_json::to_string_pretty(&item)?;
        fs::write(self.item_path(&id), json).await?;
        self.cache.write().await.insert(id.clone(), item.clone());

        debug!("💾 Recorded history entry {}", id);
        Ok(item)
    }

    /// All entries, newest first.
    pub async fn list(&self) -> Vec<HistoryItem> {
        let cache = self.cache.read().await;
        let mut items: Vec<HistoryItem> = cache.values().cloned().collect();
        items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        items
    }

    pub async fn get(&self, id: &str) -> Option<HistoryItem> {
        self.cache.read().await.get(id).cloned()
    }

    /// Remove one entry from cache and disk.
    pub async fn remove(&self, id: &str) -> Result<bool> {
        let removed = self.cache.write().await.remove(id).is_some();
        if removed {
            let path = self.item_path(id);
            if path.exists() {
                fs::remove_file(&path).await?;
            }
        }
        Ok(removed)
    }

    /// Remove all entries.
    pub async fn clear(&self) -> Result<usize> {
        let ids: Vec<String> = self.cache.read().await.keys().cloned().collect();
        let mut removed = 0;
        for id in ids {
            if self.remove(&id).await? {
                removed += 1;
            }
        }
        if removed > 0 {
            info!("🧹 Cleared {} history entries", removed);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input() -> HistoryInput {
        HistoryInput {
            content: "Photosynthesis converts light into chemical energy.".to_string(),
            output_type: OutputType::Summary,
            language: "English".to_string(),
        }
    }

    fn sample_output() -> RepurposeOutput {
        RepurposeOutput::Summary {
            summary: "Plants turn light into energy.".to_string(),
        }
    }

    #[tokio::test]
    async fn test_record_and_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().to_path_buf()).await.unwrap();

        let item = store.record(sample_input(), sample_output()).await.unwrap();
        assert!(!item.id.is_empty());

        let fetched = store.get(&item.id).await.unwrap();
        assert_eq!(fetched.input.language, "English");
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().to_path_buf()).await.unwrap();

        let first = store.record(sample_input(), sample_output()).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = store.record(sample_input(), sample_output()).await.unwrap();

        let items = store.list().await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, second.id);
        assert_eq!(items[1].id, first.id);
    }

    #[tokio::test]
    async fn test_entries_survive_reload() {
        let dir = tempfile::tempdir().unwrap();

        let store = HistoryStore::new(dir.path().to_path_buf()).await.unwrap();
        let item = store.record(sample_input(), sample_output()).await.unwrap();
        drop(store);

        let reloaded = HistoryStore::new(dir.path().to_path_buf()).await.unwrap();
        let fetched = reloaded.get(&item.id).await.unwrap();
        assert_eq!(fetched.id, item.id);
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().to_path_buf()).await.unwrap();

        let item = store.record(sample_input(), sample_output()).await.unwrap();
        assert!(store.remove(&item.id).await.unwrap());
        assert!(!store.remove(&item.id).await.unwrap());
        assert!(store.get(&item.id).await.is_none());

        store.record(sample_input(), sample_output()).await.unwrap();
        store.record(sample_input(), sample_output()).await.unwrap();
        assert_eq!(store.clear().await.unwrap(), 2);
        assert!(store.list().await.is_empty());
    }
}
