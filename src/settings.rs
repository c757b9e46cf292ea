use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
    time::Duration,
};

use crate::audio::{
    controller::{DEFAULT_FALLBACK_CAP_SECS, DEFAULT_VOLUME},
    PlaybackConfig,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioSettings {
    pub fallback_cap_secs: u32,
    pub tick_interval_ms: u64,
    pub default_volume: f32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            fallback_cap_secs: DEFAULT_FALLBACK_CAP_SECS,
            tick_interval_ms: 1000,
            default_volume: DEFAULT_VOLUME,
        }
    }
}

impl AudioSettings {
    pub fn playback_config(&self, verbose_ticks: bool) -> PlaybackConfig {
        PlaybackConfig {
            fallback_cap_secs: self.fallback_cap_secs.max(1),
            tick_interval: Duration::from_millis(self.tick_interval_ms.max(1)),
            default_volume: self.default_volume,
            verbose_ticks,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VoiceSettings {
    /// Off means the platform has no speech recognition.
    pub enabled: bool,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    pub audio: AudioSettings,
    pub voice: VoiceSettings,
    /// JSON activity catalog replacing the built-in one.
    pub catalog_path: Option<PathBuf>,
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<AppSettings>,
}

impl SettingsStore {
    /// Loads `path`, falling back to defaults for unreadable content. A missing
    /// file is created with the defaults.
    pub fn new(path: PathBuf) -> Result<Self> {
        let exists = path.exists();
        let data = if exists {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log::warn!("Ignoring malformed settings in {}: {err}", path.display());
                AppSettings::default()
            })
        } else {
            AppSettings::default()
        };

        let store = Self {
            path,
            data: RwLock::new(data),
        };
        if !exists {
            store.persist(&store.read())?;
        }
        Ok(store)
    }

    pub fn settings(&self) -> AppSettings {
        self.read().clone()
    }

    pub fn audio(&self) -> AudioSettings {
        self.read().audio.clone()
    }

    pub fn update_audio(&self, settings: AudioSettings) -> Result<()> {
        let mut guard = self.write();
        guard.audio = settings;
        self.persist(&guard)
    }

    fn read(&self) -> RwLockReadGuard<'_, AppSettings> {
        match self.data.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, AppSettings> {
        match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn persist(&self, data: &AppSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
