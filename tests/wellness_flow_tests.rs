use std::{fs, sync::Arc, time::Duration};

use mindwell_lib::{
    audio::{NoOutput, PlaybackMode, PlaybackStatus},
    commands,
    dashboard::{RiskLevel, WeeklyAverage},
    db::{EntrySource, MemoryBackend, MoodValue},
    notify::{MemoryNotifier, Severity},
    settings::SettingsStore,
    shell, AppState,
};
use tempfile::{tempdir, TempDir};

struct App {
    state: AppState,
    notifier: Arc<MemoryNotifier>,
    _dir: TempDir,
}

async fn app_with_settings(settings_json: Option<&str>) -> App {
    let dir = tempdir().unwrap();
    let settings_path = dir.path().join("settings.json");
    if let Some(json) = settings_json {
        fs::write(&settings_path, json).unwrap();
    }
    let settings = SettingsStore::new(settings_path).unwrap();
    let notifier = Arc::new(MemoryNotifier::new());
    let state = AppState::new(
        Arc::new(MemoryBackend::new()),
        settings,
        Box::new(NoOutput),
        notifier.clone(),
    )
    .await
    .unwrap();
    App {
        state,
        notifier,
        _dir: dir,
    }
}

async fn app() -> App {
    app_with_settings(None).await
}

#[tokio::test]
async fn check_in_drives_goals_and_dashboard() {
    let app = app().await;

    let check_in = commands::check_in(&app.state, 2, Some("long day".into()))
        .await
        .unwrap();
    assert_eq!(check_in.entry.notes, "long day");
    assert!(check_in.goal.matches(MoodValue::new(2).unwrap()));

    let shown = commands::get_goal(&app.state).await.unwrap();
    assert_eq!(shown, check_in.goal);

    let completion = commands::complete_goal(&app.state, None).await.unwrap();
    assert_eq!(completion.record.goal_id, check_in.goal.id);
    assert_ne!(completion.next.id, check_in.goal.id);
    assert!(completion.next.matches(MoodValue::new(2).unwrap()));

    let metrics = commands::get_dashboard(&app.state).await.unwrap();
    assert_eq!(metrics.weekly_average, WeeklyAverage::Value(2.0));
    assert_eq!(metrics.streak_days, 1);
    assert_eq!(metrics.total_check_ins, 1);
    assert_eq!(metrics.risk_level, RiskLevel::High);
    assert_eq!(metrics.recent_moods[0].when, "Today");

    let titles: Vec<String> = app.notifier.sent().into_iter().map(|n| n.title).collect();
    assert_eq!(titles, vec!["Check-in saved!", "Goal Completed! 🎉"]);
}

#[tokio::test]
async fn check_in_skips_goals_finished_this_session() {
    let app = app().await;
    commands::check_in(&app.state, 5, None).await.unwrap();
    for id in ["1", "2", "3"] {
        commands::complete_goal(&app.state, Some(id.into()))
            .await
            .unwrap();
    }

    for _ in 0..40 {
        let check_in = commands::check_in(&app.state, 5, None).await.unwrap();
        assert_eq!(check_in.goal.id, "4");
    }
    assert_eq!(commands::get_goal(&app.state).await.unwrap().id, "4");
}

#[tokio::test]
async fn invalid_check_in_changes_nothing() {
    let app = app().await;
    for bad in [0, 6] {
        assert!(commands::check_in(&app.state, bad, None).await.is_err());
    }
    assert!(commands::get_history(&app.state, None).await.unwrap().is_empty());
    let sent = app.notifier.drain();
    assert_eq!(sent.len(), 2);
    assert!(sent
        .iter()
        .all(|n| n.title == "Please select your mood" && n.severity == Severity::Destructive));

    let err = commands::complete_goal(&app.state, Some("404".into()))
        .await
        .unwrap_err();
    assert!(err.contains("404"));
}

#[tokio::test]
async fn voice_note_is_merged_into_the_check_in() {
    let app = app().await;

    commands::voice_fragment(&app.state, "I feel", false).await.unwrap();
    let note = commands::voice_fragment(&app.state, "calm", true).await.unwrap();
    assert_eq!(note, "I feel calm");
    assert_eq!(commands::voice_note(&app.state).await.unwrap(), "I feel calm");

    let check_in = commands::check_in(&app.state, 4, Some("after yoga".into()))
        .await
        .unwrap();
    assert_eq!(check_in.entry.notes, "after yoga I feel calm");
    assert_eq!(check_in.entry.source, EntrySource::Voice);
    assert_eq!(commands::voice_note(&app.state).await.unwrap(), "");
    assert!(commands::voice_fragment(&app.state, "   ", true).await.is_err());
}

#[tokio::test]
async fn rejected_check_in_keeps_the_voice_note() {
    let app = app().await;
    commands::voice_fragment(&app.state, "still here", true)
        .await
        .unwrap();

    assert!(commands::check_in(&app.state, 7, None).await.is_err());
    assert_eq!(commands::voice_note(&app.state).await.unwrap(), "still here");

    let check_in = commands::check_in(&app.state, 3, None).await.unwrap();
    assert_eq!(check_in.entry.notes, "still here");
    assert_eq!(commands::voice_note(&app.state).await.unwrap(), "");
}

#[tokio::test]
async fn unavailable_voice_notifies_once_and_keeps_manual_notes() {
    let app = app_with_settings(Some(r#"{"voice":{"enabled":false}}"#)).await;

    for _ in 0..2 {
        let note = commands::voice_fragment(&app.state, "hello", true).await.unwrap();
        assert_eq!(note, "");
    }
    let sent = app.notifier.drain();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].title, "Voice input unavailable");
    assert_eq!(sent[0].severity, Severity::Info);

    let check_in = commands::check_in(&app.state, 3, Some("typed".into()))
        .await
        .unwrap();
    assert_eq!(check_in.entry.notes, "typed");
    assert_eq!(check_in.entry.source, EntrySource::Manual);
}

#[tokio::test(start_paused = true)]
async fn activity_audio_falls_back_to_simulation() {
    let app = app_with_settings(Some(r#"{"audio":{"fallback_cap_secs":5}}"#)).await;

    let started = commands::play_activity(&app.state, "11").await.unwrap();
    assert_eq!(started.session.mode, PlaybackMode::Simulated);
    assert_eq!(started.session.volume, 0.7);
    assert_eq!(started.total, "0:05");

    tokio::time::sleep(Duration::from_millis(2500)).await;
    let status = commands::audio_status(&app.state).await.unwrap().unwrap();
    assert_eq!(status.session.position_secs, 2.0);

    let reset = commands::reset_audio(&app.state).await.unwrap();
    assert_eq!(reset.session.position_secs, 0.0);
    assert_ne!(reset.session.status, PlaybackStatus::Playing);

    commands::play_activity(&app.state, "11").await.unwrap();
    tokio::time::sleep(Duration::from_millis(10_500)).await;
    let ended = commands::audio_status(&app.state).await.unwrap().unwrap();
    assert_eq!(ended.session.status, PlaybackStatus::Ended);
    assert_eq!(ended.session.position_secs, 5.0);

    assert_eq!(commands::set_volume(&app.state, 2.0).await.unwrap(), 1.0);
    assert!(commands::play_activity(&app.state, "1").await.is_err());
    assert!(commands::play_activity(&app.state, "nope").await.is_err());
}

#[tokio::test(start_paused = true)]
async fn switching_activities_replaces_the_session() {
    let app = app().await;
    commands::play_activity(&app.state, "11").await.unwrap();
    let second = commands::play_activity(&app.state, "13").await.unwrap();
    assert_eq!(second.session.resource_ref, "audio/nature.mp3");
    assert_eq!(second.session.position_secs, 0.0);

    tokio::time::sleep(Duration::from_millis(1500)).await;
    let status = commands::audio_status(&app.state).await.unwrap().unwrap();
    assert_eq!(status.session.resource_ref, "audio/nature.mp3");
    assert_eq!(status.session.position_secs, 1.0);
}

#[tokio::test]
async fn shell_session_round_trip() {
    let app = app().await;
    let script =
        b"mood 5 great day\n\nhistory\nhistory 4000000000\ndashboard\nmood 9\nquit\nmood 1\n";
    let mut output = Vec::new();

    shell::run(&app.state, &script[..], &mut output).await.unwrap();
    let text = String::from_utf8(output).unwrap();

    assert!(text.contains("Saved"));
    assert_eq!(text.matches("Great: great day").count(), 2);
    assert!(text.contains("Risk level: low"));
    assert!(text.contains("error: validation failed"));
    assert_eq!(app.state.mood().len().await, 1);
}
