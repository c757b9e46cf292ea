use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum PlaybackStatus {
    #[default]
    Idle,
    Playing,
    Paused,
    Ended,
}

/// Where position comes from while playing: the media clock, or a 1 s
/// counter when the media could not start.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum PlaybackMode {
    #[default]
    Real,
    Simulated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioSession {
    pub resource_ref: String,
    pub status: PlaybackStatus,
    pub mode: PlaybackMode,
    pub position_secs: f64,
    /// 0 until the media reports its length.
    pub duration_secs: f64,
    pub volume: f32,
    /// Bumped on every transition; a tick carrying an older value is stale.
    #[serde(skip)]
    pub generation: u64,
}

impl AudioSession {
    pub fn new(resource_ref: impl Into<String>, volume: f32) -> Self {
        Self {
            resource_ref: resource_ref.into(),
            status: PlaybackStatus::Idle,
            mode: PlaybackMode::Real,
            position_secs: 0.0,
            duration_secs: 0.0,
            volume: clamp_volume(volume),
            generation: 0,
        }
    }

    pub fn playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }

    pub fn begin(&mut self, mode: PlaybackMode) {
        if self.status == PlaybackStatus::Ended {
            self.position_secs = 0.0;
        }
        self.status = PlaybackStatus::Playing;
        self.mode = mode;
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn pause(&mut self) {
        if self.playing() {
            self.status = PlaybackStatus::Paused;
        }
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn reset(&mut self) {
        self.position_secs = 0.0;
        if self.status != PlaybackStatus::Idle {
            self.status = PlaybackStatus::Paused;
        }
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn finish(&mut self) {
        self.status = PlaybackStatus::Ended;
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn set_volume(&mut self, volume: f32) -> f32 {
        self.volume = clamp_volume(volume);
        self.volume
    }

    pub fn set_duration(&mut self, duration_secs: f64) {
        if duration_secs.is_finite() && duration_secs > 0.0 {
            self.duration_secs = duration_secs;
        }
    }

    /// One simulated second. Returns true once the cap is reached.
    pub fn advance_simulated(&mut self, cap_secs: f64) -> bool {
        self.position_secs = (self.position_secs + 1.0).min(cap_secs);
        if self.position_secs >= cap_secs {
            self.finish();
            return true;
        }
        false
    }

    /// Copies the media clock in. Returns true when the track has ended.
    pub fn sync_media(&mut self, current_secs: f64, duration_secs: Option<f64>, cap_secs: f64) -> bool {
        if let Some(duration) = duration_secs {
            self.set_duration(duration);
        }

        let limit = self.duration_secs.max(cap_secs);
        self.position_secs = if current_secs.is_finite() {
            current_secs.clamp(0.0, limit)
        } else {
            0.0
        };

        if self.duration_secs > 0.0 && self.position_secs >= self.duration_secs {
            self.finish();
            return true;
        }
        false
    }

    pub fn progress_percent(&self) -> f64 {
        if self.duration_secs > 0.0 {
            (self.position_secs / self.duration_secs * 100.0).min(100.0)
        } else {
            0.0
        }
    }

    /// Length shown to the user; the fallback cap stands in while unknown.
    pub fn display_duration(&self, cap_secs: f64) -> f64 {
        if self.duration_secs > 0.0 {
            self.duration_secs
        } else {
            cap_secs
        }
    }
}

pub fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}

/// `m:ss`, e.g. 75.4 -> "1:15".
pub fn format_clock(secs: f64) -> String {
    let total = if secs.is_finite() { secs.max(0.0) as u64 } else { 0 };
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_is_clamped() {
        let mut session = AudioSession::new("x", 3.0);
        assert_eq!(session.volume, 1.0);
        assert_eq!(session.set_volume(-0.5), 0.0);
        assert_eq!(session.set_volume(f32::NAN), 0.0);
        assert_eq!(session.set_volume(0.4), 0.4);
    }

    #[test]
    fn simulated_counter_stops_at_cap() {
        let mut session = AudioSession::new("x", 0.7);
        session.begin(PlaybackMode::Simulated);
        assert!(!session.advance_simulated(3.0));
        assert!(!session.advance_simulated(3.0));
        assert!(session.advance_simulated(3.0));
        assert_eq!(session.status, PlaybackStatus::Ended);
        assert_eq!(session.position_secs, 3.0);
    }

    #[test]
    fn replay_after_end_starts_over() {
        let mut session = AudioSession::new("x", 0.7);
        session.begin(PlaybackMode::Simulated);
        session.advance_simulated(1.0);
        session.begin(PlaybackMode::Simulated);
        assert_eq!(session.position_secs, 0.0);
        assert!(session.playing());
    }

    #[test]
    fn media_clock_is_bounded() {
        let mut session = AudioSession::new("x", 0.7);
        session.begin(PlaybackMode::Real);
        assert!(!session.sync_media(500.0, None, 300.0));
        assert_eq!(session.position_secs, 300.0);

        assert!(session.sync_media(42.0, Some(40.0), 300.0));
        assert_eq!(session.status, PlaybackStatus::Ended);
        assert_eq!(session.duration_secs, 40.0);
    }

    #[test]
    fn reset_never_leaves_playing() {
        let mut idle = AudioSession::new("x", 0.7);
        idle.reset();
        assert_eq!(idle.status, PlaybackStatus::Idle);

        let mut playing = AudioSession::new("x", 0.7);
        playing.begin(PlaybackMode::Real);
        playing.position_secs = 12.0;
        let before = playing.generation;
        playing.reset();
        assert_eq!(playing.status, PlaybackStatus::Paused);
        assert_eq!(playing.position_secs, 0.0);
        assert_ne!(playing.generation, before);
    }

    #[test]
    fn progress_and_clock_labels() {
        let mut session = AudioSession::new("x", 0.7);
        assert_eq!(session.progress_percent(), 0.0);
        assert_eq!(session.display_duration(300.0), 300.0);
        session.set_duration(200.0);
        session.position_secs = 50.0;
        assert_eq!(session.progress_percent(), 25.0);
        assert_eq!(format_clock(75.4), "1:15");
        assert_eq!(format_clock(300.0), "5:00");
    }
}
