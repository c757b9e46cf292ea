use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use log::{info, warn};
use tokio::sync::Mutex;

use crate::{
    db::{keys, EntrySource, MoodEntry, MoodValue, StateBackend},
    error::WellnessError,
};

struct MoodState {
    history: Vec<MoodEntry>,
    current: MoodValue,
}

/// Single writer of the mood history. Readers get clones; the history itself
/// is only ever appended to.
#[derive(Clone)]
pub struct MoodStateStore {
    state: Arc<Mutex<MoodState>>,
    backend: Arc<dyn StateBackend>,
}

impl MoodStateStore {
    /// Restores history and current mood. Storage read failures start the store
    /// empty instead of failing.
    pub async fn open(backend: Arc<dyn StateBackend>) -> Self {
        let history = match backend.load_entries().await {
            Ok(entries) => entries,
            Err(err) => {
                warn!("Mood history unavailable, starting empty: {err:#}");
                Vec::new()
            }
        };

        let stored_current = match backend.get(keys::CURRENT_MOOD).await {
            Ok(raw) => raw.and_then(|value| parse_stored_mood(&value)),
            Err(err) => {
                warn!("Failed to read current mood: {err:#}");
                None
            }
        };

        let current = history
            .last()
            .map(|entry| entry.mood)
            .or(stored_current)
            .unwrap_or(MoodValue::NEUTRAL);

        info!(
            "Mood store opened with {} entries, current mood {}",
            history.len(),
            current
        );

        Self {
            state: Arc::new(Mutex::new(MoodState { history, current })),
            backend,
        }
    }

    pub async fn set_mood(
        &self,
        value: i64,
        notes: Option<&str>,
    ) -> Result<MoodEntry, WellnessError> {
        self.record(value, notes, EntrySource::Manual).await
    }

    /// Check-in whose notes came from a voice transcript.
    pub async fn set_mood_from_voice(
        &self,
        value: i64,
        transcript: &str,
    ) -> Result<MoodEntry, WellnessError> {
        self.record(value, Some(transcript), EntrySource::Voice).await
    }

    async fn record(
        &self,
        value: i64,
        notes: Option<&str>,
        source: EntrySource,
    ) -> Result<MoodEntry, WellnessError> {
        let mood = MoodValue::new(value)?;
        let notes = notes.map(str::trim).unwrap_or_default();

        // Held across the writes so concurrent check-ins keep submission order.
        let mut state = self.state.lock().await;

        let entry = MoodEntry::new(mood, notes, source, Utc::now());
        self.backend
            .append_entry(&entry)
            .await
            .map_err(|err| WellnessError::Persistence(format!("{err:#}")))?;

        if let Err(err) = self
            .backend
            .set(keys::CURRENT_MOOD, &mood.to_string())
            .await
        {
            warn!("Failed to persist current mood {mood}: {err:#}");
        }

        state.history.push(entry.clone());
        state.current = mood;
        Ok(entry)
    }

    pub async fn get_current_mood(&self) -> MoodValue {
        self.state.lock().await.current
    }

    /// Entries from the last `since_days` days, oldest first; `None` returns
    /// everything.
    pub async fn get_history(&self, since_days: Option<u32>) -> Vec<MoodEntry> {
        self.history_at(since_days, Utc::now()).await
    }

    pub async fn history_at(&self, since_days: Option<u32>, now: DateTime<Utc>) -> Vec<MoodEntry> {
        let state = self.state.lock().await;
        match since_days {
            None => state.history.clone(),
            Some(days) => {
                // A window reaching past the earliest representable time covers everything.
                let cutoff = Duration::try_days(i64::from(days))
                    .and_then(|window| now.checked_sub_signed(window));
                match cutoff {
                    Some(cutoff) => state
                        .history
                        .iter()
                        .filter(|entry| entry.timestamp >= cutoff)
                        .cloned()
                        .collect(),
                    None => state.history.clone(),
                }
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.history.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn parse_stored_mood(raw: &str) -> Option<MoodValue> {
    match raw.trim().parse::<i64>().map(MoodValue::new) {
        Ok(Ok(mood)) => Some(mood),
        _ => {
            warn!("Ignoring stored current mood {raw:?}");
            None
        }
    }
}
