//! Boundary to whatever actually decodes and plays audio.

use anyhow::{anyhow, Result};
use async_trait::async_trait;

/// Push notifications a media element may deliver instead of being polled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediaEvent {
    TimeUpdate(f64),
    LoadedMetadata(f64),
    Ended,
}

#[async_trait]
pub trait MediaElement: Send {
    /// Starts or resumes output. An error means the resource cannot play.
    async fn play(&mut self) -> Result<()>;

    fn pause(&mut self);

    fn current_time(&self) -> f64;

    fn set_current_time(&mut self, secs: f64);

    /// `None` until metadata has loaded.
    fn duration(&self) -> Option<f64>;

    fn set_volume(&mut self, volume: f32);
}

/// Opens a media element for an activity's resource reference.
pub trait MediaSource: Send + Sync {
    fn open(&self, resource_ref: &str) -> Box<dyn MediaElement>;
}

/// Element that never plays; every session on it runs simulated.
pub struct SilentMedia {
    reason: String,
    position: f64,
}

impl SilentMedia {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            position: 0.0,
        }
    }
}

#[async_trait]
impl MediaElement for SilentMedia {
    async fn play(&mut self) -> Result<()> {
        Err(anyhow!("{}", self.reason))
    }

    fn pause(&mut self) {}

    fn current_time(&self) -> f64 {
        self.position
    }

    fn set_current_time(&mut self, secs: f64) {
        self.position = secs;
    }

    fn duration(&self) -> Option<f64> {
        None
    }

    fn set_volume(&mut self, _volume: f32) {}
}

/// Used when the build has no audio output.
pub struct NoOutput;

impl MediaSource for NoOutput {
    fn open(&self, resource_ref: &str) -> Box<dyn MediaElement> {
        Box::new(SilentMedia::new(format!(
            "no audio output available for {resource_ref}"
        )))
    }
}
