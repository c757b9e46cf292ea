use std::sync::Arc;

use mindwell_lib::{
    catalog::Catalog,
    db::{keys, Database, EntrySource, StateBackend},
    mood::MoodStateStore,
    notify::MemoryNotifier,
    recommend::RecommendationEngine,
};
use rand::{rngs::StdRng, SeedableRng};
use tempfile::tempdir;

#[tokio::test]
async fn history_and_completions_survive_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mindwell.sqlite3");

    {
        let backend: Arc<dyn StateBackend> = Arc::new(Database::new(path.clone()).unwrap());
        let store = MoodStateStore::open(backend.clone()).await;
        store.set_mood(4, Some("morning walk")).await.unwrap();
        store.set_mood_from_voice(2, "tense meeting").await.unwrap();

        let engine = RecommendationEngine::open_with_rng(
            Arc::new(Catalog::builtin()),
            store.clone(),
            backend.clone(),
            Arc::new(MemoryNotifier::new()),
            StdRng::seed_from_u64(5),
        )
        .await;
        engine.mark_complete("7").await.unwrap();
        engine.mark_complete("3").await.unwrap();
    }

    let database = Database::new(path).unwrap();
    let backend: Arc<dyn StateBackend> = Arc::new(database.clone());
    let store = MoodStateStore::open(backend.clone()).await;

    assert_eq!(store.get_current_mood().await.get(), 2);
    let history = store.get_history(None).await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].notes, "morning walk");
    assert_eq!(history[0].source, EntrySource::Manual);
    assert_eq!(history[1].notes, "tense meeting");
    assert_eq!(history[1].source, EntrySource::Voice);
    assert!(history[0].timestamp <= history[1].timestamp);

    assert_eq!(
        database.get(keys::CURRENT_MOOD).await.unwrap().as_deref(),
        Some("2")
    );
    assert_eq!(
        database.get(keys::COMPLETED_GOALS).await.unwrap().as_deref(),
        Some(r#"["7","3"]"#)
    );
}

#[tokio::test]
async fn missing_keys_read_as_absent() {
    let dir = tempdir().unwrap();
    let database = Database::new(dir.path().join("fresh.sqlite3")).unwrap();

    assert_eq!(database.get(keys::CURRENT_MOOD).await.unwrap(), None);
    assert!(database.load_entries().await.unwrap().is_empty());

    let store = MoodStateStore::open(Arc::new(database)).await;
    assert_eq!(store.get_current_mood().await.get(), 3);
}

#[tokio::test]
async fn key_values_overwrite() {
    let dir = tempdir().unwrap();
    let database = Database::new(dir.path().join("kv.sqlite3")).unwrap();

    database.set(keys::CURRENT_MOOD, "1").await.unwrap();
    database.set(keys::CURRENT_MOOD, "5").await.unwrap();
    assert_eq!(
        database.get(keys::CURRENT_MOOD).await.unwrap().as_deref(),
        Some("5")
    );
}
