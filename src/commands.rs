//! Operations behind the command shell. Every handler reports failures as a
//! display string so the caller never sees an internal error type.

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::{
    audio::{AudioPlaybackController, PlaybackSnapshot},
    catalog::Activity,
    dashboard::DashboardMetrics,
    db::MoodEntry,
    error::{require_text, WellnessError},
    notify::Severity,
    recommend::Completion,
    voice::{self, NoSpeech, ScriptedSpeech, SpeechCapture},
    AppState,
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckIn {
    pub entry: MoodEntry,
    pub goal: Activity,
}

/// Records a check-in. Any captured voice note is appended to the typed
/// notes, marks the entry as voice-sourced and is cleared once saved. The
/// voice buffer stays locked until then so no fragment lands in between.
pub async fn check_in(
    state: &AppState,
    value: i64,
    notes: Option<String>,
) -> Result<CheckIn, String> {
    let typed = notes.unwrap_or_default();
    let mut buffer = state.voice.lock().await;
    let spoken = buffer.commit();

    let saved = if spoken.is_empty() {
        state.mood.set_mood(value, Some(typed.as_str())).await
    } else {
        let merged = if typed.trim().is_empty() {
            spoken
        } else {
            format!("{} {}", typed.trim(), spoken)
        };
        state.mood.set_mood_from_voice(value, &merged).await
    };
    let entry = match saved {
        Ok(entry) => entry,
        Err(err @ WellnessError::Validation(_)) => {
            state.notifier.notify(
                "Please select your mood",
                "Choose how you're feeling from 1 to 5 before saving.",
                Severity::Destructive,
            );
            return Err(err.to_string());
        }
        Err(err) => return Err(err.to_string()),
    };

    buffer.clear();
    drop(buffer);
    state.notifier.notify(
        "Check-in saved!",
        &format!(
            "Feeling {} {} today. Thanks for checking in.",
            entry.mood.label().to_lowercase(),
            entry.mood.emoji()
        ),
        Severity::Success,
    );

    let goal = state
        .engine
        .select_for_mood(entry.mood)
        .await
        .map_err(|e| e.to_string())?;

    Ok(CheckIn { entry, goal })
}

pub async fn get_history(state: &AppState, since_days: Option<u32>) -> Result<Vec<MoodEntry>, String> {
    Ok(state.mood.get_history(since_days).await)
}

/// The goal on display, picking one for the current mood if none is yet.
pub async fn get_goal(state: &AppState) -> Result<Activity, String> {
    if let Some(goal) = state.engine.current_goal().await {
        return Ok(goal);
    }
    state.engine.next_goal().await.map_err(|e| e.to_string())
}

pub async fn complete_goal(state: &AppState, goal_id: Option<String>) -> Result<Completion, String> {
    let goal_id = match goal_id {
        Some(id) => id,
        None => state
            .engine
            .current_goal()
            .await
            .map(|goal| goal.id)
            .ok_or_else(|| "no goal selected yet".to_string())?,
    };
    state
        .engine
        .mark_complete(&goal_id)
        .await
        .map_err(|e| e.to_string())
}

pub async fn get_dashboard(state: &AppState) -> Result<DashboardMetrics, String> {
    Ok(state.dashboard.metrics().await)
}

/// Starts an activity's audio, replacing the session of any other activity.
pub async fn play_activity(state: &AppState, activity_id: &str) -> Result<PlaybackSnapshot, String> {
    let activity = state
        .engine
        .catalog()
        .get(activity_id)
        .ok_or_else(|| format!("unknown activity id: {activity_id}"))?;
    let resource_ref = activity
        .audio
        .clone()
        .ok_or_else(|| format!("activity {activity_id} has no audio"))?;

    let mut player = state.player.lock().await;
    let reuse = match player.as_ref() {
        Some(existing) => existing.resource_ref().await == resource_ref,
        None => false,
    };

    if !reuse {
        if let Some(previous) = player.take() {
            previous.close().await;
        }
        let config = state.settings.audio().playback_config(state.verbose);
        *player = Some(AudioPlaybackController::new(
            resource_ref.clone(),
            state.media.open(&resource_ref),
            config,
        ));
    }

    match player.as_ref() {
        Some(controller) => Ok(controller.play().await),
        None => Err("audio session unavailable".to_string()),
    }
}

async fn current_player(state: &AppState) -> Result<AudioPlaybackController, String> {
    state
        .player
        .lock()
        .await
        .clone()
        .ok_or_else(|| "nothing is playing".to_string())
}

pub async fn pause_audio(state: &AppState) -> Result<PlaybackSnapshot, String> {
    Ok(current_player(state).await?.pause().await)
}

pub async fn reset_audio(state: &AppState) -> Result<PlaybackSnapshot, String> {
    Ok(current_player(state).await?.reset().await)
}

pub async fn toggle_audio(state: &AppState) -> Result<PlaybackSnapshot, String> {
    Ok(current_player(state).await?.toggle_play().await)
}

/// Applies to the live session, if any, and becomes the default for new ones.
pub async fn set_volume(state: &AppState, volume: f32) -> Result<f32, String> {
    let applied = match state.player.lock().await.clone() {
        Some(controller) => controller.set_volume(volume).await,
        None => crate::audio::state::clamp_volume(volume),
    };

    let mut audio = state.settings.audio();
    audio.default_volume = applied;
    state
        .settings
        .update_audio(audio)
        .map_err(|e| e.to_string())?;
    Ok(applied)
}

pub async fn audio_status(state: &AppState) -> Result<Option<PlaybackSnapshot>, String> {
    match state.player.lock().await.clone() {
        Some(controller) => Ok(Some(controller.snapshot().await)),
        None => Ok(None),
    }
}

/// Feeds one recognized fragment through a capture session and returns the
/// note so far.
pub async fn voice_fragment(state: &AppState, text: &str, is_final: bool) -> Result<String, String> {
    let text = require_text(text, "speech").map_err(|e| e.to_string())?;

    let mut speech: Box<dyn SpeechCapture> = if state.settings.settings().voice.enabled {
        Box::new(ScriptedSpeech::new([(text, is_final)]))
    } else {
        Box::new(NoSpeech)
    };

    let mut buffer = state.voice.lock().await;
    Ok(voice::capture(
        &mut buffer,
        speech.as_mut(),
        state.notifier.as_ref(),
        CancellationToken::new(),
    )
    .await)
}

pub async fn voice_note(state: &AppState) -> Result<String, String> {
    Ok(state.voice.lock().await.commit())
}

pub async fn clear_voice_note(state: &AppState) -> Result<(), String> {
    state.voice.lock().await.clear();
    Ok(())
}

/// Stops any audio before the process exits.
pub async fn shutdown(state: &AppState) -> Result<(), String> {
    if let Some(controller) = state.player.lock().await.take() {
        controller.close().await;
    }
    Ok(())
}
