//! Recently resolved places.
//!
//! Recording is best-effort: the resolver logs store failures and carries on,
//! so a read-only disk or a corrupt file never blocks a weather lookup.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, io::ErrorKind, path::PathBuf};
use tokio::{fs, sync::Mutex};

use crate::config::Config;

/// Entries kept by [`FileLocationStore`].
pub const MAX_ENTRIES: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub timestamp: DateTime<Utc>,
}

#[async_trait]
pub trait LocationStore: Send + Sync + Debug {
    async fn record(&self, entry: HistoryEntry) -> Result<()>;

    /// Most recent entries first.
    async fn recent(&self, limit: usize) -> Result<Vec<HistoryEntry>>;
}

#[derive(Debug, Default)]
pub struct MemoryLocationStore {
    entries: Mutex<Vec<HistoryEntry>>,
}

impl MemoryLocationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LocationStore for MemoryLocationStore {
    async fn record(&self, entry: HistoryEntry) -> Result<()> {
        self.entries.lock().await.push(entry);
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<HistoryEntry>> {
        let entries = self.entries.lock().await;
        Ok(entries.iter().rev().take(limit).cloned().collect())
    }
}

/// JSON file in the platform data directory, oldest entry first on disk.
#[derive(Debug)]
pub struct FileLocationStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileLocationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn default_location() -> Result<Self> {
        let dirs = Config::project_dirs()?;
        Ok(Self::new(dirs.data_dir().join("history.json")))
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Vec<HistoryEntry>> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("Failed to read history file: {}", self.path.display())
                });
            }
        };
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse history file: {}", self.path.display()))
    }

    async fn write_all(&self, entries: &[HistoryEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create history directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_string_pretty(entries).context("Failed to serialize history")?;
        fs::write(&self.path, json)
            .await
            .with_context(|| format!("Failed to write history file: {}", self.path.display()))
    }
}

#[async_trait]
impl LocationStore for FileLocationStore {
    async fn record(&self, entry: HistoryEntry) -> Result<()> {
        let _guard = self.lock.lock().await;

        let mut entries = self.read_all().await?;
        entries.push(entry);
        if entries.len() > MAX_ENTRIES {
            let overflow = entries.len() - MAX_ENTRIES;
            entries.drain(..overflow);
        }

        self.write_all(&entries).await
    }

    async fn recent(&self, limit: usize) -> Result<Vec<HistoryEntry>> {
        let _guard = self.lock.lock().await;

        let entries = self.read_all().await?;
        Ok(entries.into_iter().rev().take(limit).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(name: &str, minute: u32) -> HistoryEntry {
        HistoryEntry {
            name: name.to_string(),
            lat: 48.85,
            lon: 2.35,
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn memory_store_returns_newest_first() {
        let store = MemoryLocationStore::new();
        store.record(entry("Paris", 0)).await.unwrap();
        store.record(entry("Lyon", 1)).await.unwrap();
        store.record(entry("Nice", 2)).await.unwrap();

        let recent = store.recent(2).await.unwrap();
        let names: Vec<_> = recent.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Nice", "Lyon"]);
    }

    #[tokio::test]
    async fn file_store_persists_and_caps() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data").join("history.json");
        let store = FileLocationStore::new(&path);

        for i in 0..(MAX_ENTRIES as u32 + 5) {
            store.record(entry(&format!("City {i}"), i % 60)).await.unwrap();
        }

        let reopened = FileLocationStore::new(&path);
        let all = reopened.recent(usize::MAX).await.unwrap();
        assert_eq!(all.len(), MAX_ENTRIES);
        assert_eq!(all[0].name, format!("City {}", MAX_ENTRIES + 4));
        assert_eq!(all.last().map(|e| e.name.as_str()), Some("City 5"));
    }

    #[tokio::test]
    async fn missing_file_is_empty_history() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileLocationStore::new(dir.path().join("none.json"));

        assert!(store.recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("history.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileLocationStore::new(&path);
        let err = store.recent(10).await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse history file"));
    }

    #[tokio::test]
    async fn concurrent_records_are_all_kept() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = std::sync::Arc::new(FileLocationStore::new(dir.path().join("history.json")));

        let tasks: Vec<_> = (0..8u32)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.record(entry(&format!("City {i}"), i)).await })
            })
            .collect();
        for task in tasks {
            task.await.expect("join").expect("record");
        }

        assert_eq!(store.recent(usize::MAX).await.unwrap().len(), 8);
    }
}
