use std::sync::Arc;

use chrono::{Local, Utc};
use log::{info, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::{
    catalog::{Activity, Catalog},
    db::{keys, CompletionRecord, MoodValue, StateBackend},
    error::WellnessError,
    mood::MoodStateStore,
    notify::{Notifier, Severity},
};

use super::selection;

/// Outcome of finishing a goal: the appended record and the follow-up pick.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    pub record: CompletionRecord,
    pub next: Activity,
}

struct EngineState<R> {
    rng: R,
    current: Option<Activity>,
    /// Completion order for this session.
    completions: Vec<CompletionRecord>,
    /// Ids finished this session; kept out of follow-up picks.
    session_exclusions: Vec<String>,
    /// Every id ever completed, mirrored to the `completedGoals` key.
    completed_ids: Vec<String>,
}

pub struct RecommendationEngine<R = StdRng> {
    catalog: Arc<Catalog>,
    mood: MoodStateStore,
    backend: Arc<dyn StateBackend>,
    notifier: Arc<dyn Notifier>,
    state: Mutex<EngineState<R>>,
}

impl RecommendationEngine<StdRng> {
    pub async fn open(
        catalog: Arc<Catalog>,
        mood: MoodStateStore,
        backend: Arc<dyn StateBackend>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self::open_with_rng(catalog, mood, backend, notifier, StdRng::from_entropy()).await
    }
}

impl<R: Rng + Send> RecommendationEngine<R> {
    /// Same as `open` with a caller-supplied random source, e.g. a seeded
    /// `StdRng` for reproducible picks.
    pub async fn open_with_rng(
        catalog: Arc<Catalog>,
        mood: MoodStateStore,
        backend: Arc<dyn StateBackend>,
        notifier: Arc<dyn Notifier>,
        rng: R,
    ) -> Self {
        let completed_ids = load_completed_ids(backend.as_ref()).await;

        Self {
            catalog,
            mood,
            backend,
            notifier,
            state: Mutex::new(EngineState {
                rng,
                current: None,
                completions: Vec::new(),
                session_exclusions: Vec::new(),
                completed_ids,
            }),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub async fn select_goal(
        &self,
        mood: MoodValue,
        exclude_ids: &[String],
    ) -> Result<Activity, WellnessError> {
        let mut state = self.state.lock().await;
        let goal = selection::select_goal(&self.catalog, mood, exclude_ids, &mut state.rng)?.clone();
        state.current = Some(goal.clone());
        Ok(goal)
    }

    /// Fresh pick for `mood`, skipping goals already finished this session.
    pub async fn select_for_mood(&self, mood: MoodValue) -> Result<Activity, WellnessError> {
        let mut state = self.state.lock().await;
        self.pick_for_session(&mut state, mood)
    }

    /// `select_for_mood` with the stored current mood.
    pub async fn next_goal(&self) -> Result<Activity, WellnessError> {
        let mood = self.mood.get_current_mood().await;
        self.select_for_mood(mood).await
    }

    fn pick_for_session(
        &self,
        state: &mut EngineState<R>,
        mood: MoodValue,
    ) -> Result<Activity, WellnessError> {
        let EngineState {
            rng,
            session_exclusions,
            current,
            ..
        } = state;
        let goal = selection::select_goal(&self.catalog, mood, session_exclusions, rng)?.clone();
        *current = Some(goal.clone());
        Ok(goal)
    }

    pub async fn current_goal(&self) -> Option<Activity> {
        self.state.lock().await.current.clone()
    }

    pub async fn mark_complete(&self, goal_id: &str) -> Result<Completion, WellnessError> {
        if !self.catalog.contains(goal_id) {
            return Err(WellnessError::UnknownGoal(goal_id.to_string()));
        }

        let mood = self.mood.get_current_mood().await;
        let mut state = self.state.lock().await;

        let record = CompletionRecord {
            goal_id: goal_id.to_string(),
            completed_at: Utc::now(),
        };
        state.completions.push(record.clone());
        state.session_exclusions.push(record.goal_id.clone());
        state.completed_ids.push(record.goal_id.clone());

        match serde_json::to_string(&state.completed_ids) {
            Ok(serialized) => {
                if let Err(err) = self.backend.set(keys::COMPLETED_GOALS, &serialized).await {
                    warn!("Failed to persist completed goals: {err:#}");
                }
            }
            Err(err) => warn!("Failed to serialize completed goals: {err}"),
        }

        info!(
            "Goal {} completed ({} this session)",
            goal_id,
            state.completions.len()
        );
        self.notifier.notify(
            "Goal Completed! 🎉",
            "Amazing work! You're taking great care of your mental health.",
            Severity::Success,
        );

        let next = self.pick_for_session(&mut state, mood)?;
        Ok(Completion { record, next })
    }

    pub async fn completions(&self) -> Vec<CompletionRecord> {
        self.state.lock().await.completions.clone()
    }

    /// Completions recorded on the local calendar day.
    pub async fn completed_today(&self) -> usize {
        let today = Local::now().date_naive();
        self.state
            .lock()
            .await
            .completions
            .iter()
            .filter(|record| record.completed_at.with_timezone(&Local).date_naive() == today)
            .count()
    }

    /// Ids completed across sessions, in completion order.
    pub async fn completed_goal_ids(&self) -> Vec<String> {
        self.state.lock().await.completed_ids.clone()
    }
}

async fn load_completed_ids(backend: &dyn StateBackend) -> Vec<String> {
    match backend.get(keys::COMPLETED_GOALS).await {
        Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|err| {
            warn!("Ignoring unreadable completed goals: {err}");
            Vec::new()
        }),
        Ok(None) => Vec::new(),
        Err(err) => {
            warn!("Failed to read completed goals: {err:#}");
            Vec::new()
        }
    }
}
