//! Pluggable persistence behind the mood store and recommendation engine.
//!
//! Two shapes of state are durable: a small key/value map (current mood,
//! completed goal ids) and the append-only mood journal. `Database` backs both
//! with SQLite; `MemoryBackend` keeps them in process for tests and throwaway
//! sessions.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use super::{models::MoodEntry, Database};

pub mod keys {
    pub const CURRENT_MOOD: &str = "currentMood";
    pub const COMPLETED_GOALS: &str = "completedGoals";
}

#[async_trait]
pub trait StateBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    async fn append_entry(&self, entry: &MoodEntry) -> Result<()>;

    /// Full journal, oldest first.
    async fn load_entries(&self) -> Result<Vec<MoodEntry>>;
}

#[async_trait]
impl StateBackend for Database {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.get_value(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.set_value(key, value).await
    }

    async fn append_entry(&self, entry: &MoodEntry) -> Result<()> {
        self.insert_mood_entry(entry).await
    }

    async fn load_entries(&self) -> Result<Vec<MoodEntry>> {
        self.list_mood_entries().await
    }
}

#[derive(Default)]
struct MemoryState {
    values: HashMap<String, String>,
    entries: Vec<MoodEntry>,
    fail_writes: bool,
}

#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeded journal, e.g. history imported from an earlier install.
    pub fn with_entries(entries: Vec<MoodEntry>) -> Self {
        let backend = Self::default();
        backend.lock().entries = entries;
        backend
    }

    /// Makes every subsequent write fail, to exercise degraded storage.
    pub fn fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl StateBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock().values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut state = self.lock();
        if state.fail_writes {
            return Err(anyhow!("memory backend is read-only"));
        }
        state.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn append_entry(&self, entry: &MoodEntry) -> Result<()> {
        let mut state = self.lock();
        if state.fail_writes {
            return Err(anyhow!("memory backend is read-only"));
        }
        state.entries.push(entry.clone());
        Ok(())
    }

    async fn load_entries(&self) -> Result<Vec<MoodEntry>> {
        Ok(self.lock().entries.clone())
    }
}
