pub mod audio;
pub mod catalog;
pub mod commands;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod mood;
pub mod notify;
pub mod recommend;
pub mod settings;
pub mod shell;
mod utils;
pub mod voice;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use log::info;
use tokio::sync::Mutex;

use audio::{AudioPlaybackController, MediaSource};
use catalog::Catalog;
use dashboard::DashboardAggregator;
use db::{Database, StateBackend};
use error::WellnessError;
use mood::MoodStateStore;
use notify::{LogNotifier, Notifier};
use recommend::RecommendationEngine;
use settings::SettingsStore;
use voice::VoiceCaptureBuffer;

pub use utils::debug_enabled;

pub struct AppState {
    pub(crate) mood: MoodStateStore,
    pub(crate) engine: RecommendationEngine,
    pub(crate) dashboard: DashboardAggregator,
    /// Audio for the activity currently on display.
    pub(crate) player: Mutex<Option<AudioPlaybackController>>,
    pub(crate) voice: Mutex<VoiceCaptureBuffer>,
    pub(crate) media: Box<dyn MediaSource>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) settings: SettingsStore,
    pub(crate) verbose: bool,
}

impl AppState {
    pub async fn new(
        backend: Arc<dyn StateBackend>,
        settings: SettingsStore,
        media: Box<dyn MediaSource>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let catalog = match settings.settings().catalog_path {
            Some(path) => Catalog::from_json_file(&path)
                .with_context(|| format!("Failed to load catalog from {}", path.display()))?,
            None => Catalog::builtin(),
        };
        if catalog.is_empty() {
            return Err(WellnessError::CatalogEmpty.into());
        }
        info!("Loaded {} activities", catalog.len());

        let mood = MoodStateStore::open(backend.clone()).await;
        let engine =
            RecommendationEngine::open(Arc::new(catalog), mood.clone(), backend, notifier.clone())
                .await;

        Ok(Self {
            dashboard: DashboardAggregator::new(mood.clone()),
            mood,
            engine,
            player: Mutex::new(None),
            voice: Mutex::new(VoiceCaptureBuffer::new(true)),
            media,
            notifier,
            settings,
            verbose: debug_enabled(),
        })
    }

    pub fn mood(&self) -> &MoodStateStore {
        &self.mood
    }
}

fn data_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os("MINDWELL_DATA_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::data_dir()
        .map(|dir| dir.join("mindwell"))
        .context("no data directory available; set MINDWELL_DATA_DIR")
}

#[cfg(feature = "speaker")]
fn media_source(data_dir: &std::path::Path) -> Box<dyn MediaSource> {
    Box::new(audio::RodioSource::new(data_dir))
}

#[cfg(not(feature = "speaker"))]
fn media_source(_data_dir: &std::path::Path) -> Box<dyn MediaSource> {
    Box::new(audio::NoOutput)
}

pub fn run() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(if debug_enabled() {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    log::info!("Mindwell starting up...");

    let app_data_dir = data_dir()?;
    std::fs::create_dir_all(&app_data_dir)
        .with_context(|| format!("Failed to create {}", app_data_dir.display()))?;

    let database = Database::new(app_data_dir.join("mindwell.sqlite3"))?;
    let settings = SettingsStore::new(app_data_dir.join("settings.json"))?;
    let media = media_source(&app_data_dir);

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(async move {
        let state = AppState::new(Arc::new(database), settings, media, Arc::new(LogNotifier)).await?;
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let mut stdout = tokio::io::stdout();
        shell::run(&state, stdin, &mut stdout).await
    })
}
