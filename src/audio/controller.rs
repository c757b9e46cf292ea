use std::{
    sync::{Arc, Mutex as StdMutex},
    time::Duration,
};

use log::info;
use serde::Serialize;
use tokio::{sync::Mutex, task::JoinHandle, time};

use crate::log_debug;

use super::{
    media::{MediaElement, MediaEvent},
    state::{format_clock, AudioSession, PlaybackMode, PlaybackStatus},
};

const ENABLE_LOGS: bool = true;

pub const DEFAULT_FALLBACK_CAP_SECS: u32 = 300;
pub const DEFAULT_VOLUME: f32 = 0.7;

#[derive(Debug, Clone, Copy)]
pub struct PlaybackConfig {
    pub fallback_cap_secs: u32,
    pub tick_interval: Duration,
    pub default_volume: f32,
    /// Log every tick at debug level.
    pub verbose_ticks: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            fallback_cap_secs: DEFAULT_FALLBACK_CAP_SECS,
            tick_interval: Duration::from_secs(1),
            default_volume: DEFAULT_VOLUME,
            verbose_ticks: false,
        }
    }
}

impl PlaybackConfig {
    fn cap_secs(&self) -> f64 {
        self.fallback_cap_secs as f64
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSnapshot {
    pub session: AudioSession,
    pub progress_percent: f64,
    pub elapsed: String,
    pub total: String,
}

/// Holds the one live ticker. Replacing or dropping it aborts the old task.
#[derive(Default)]
struct TickerSlot {
    handle: StdMutex<Option<JoinHandle<()>>>,
}

impl TickerSlot {
    fn replace(&self, handle: JoinHandle<()>) {
        let mut guard = match self.handle.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(previous) = guard.replace(handle) {
            previous.abort();
        }
    }

    fn cancel(&self) {
        let mut guard = match self.handle.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(handle) = guard.take() {
            handle.abort();
        }
    }
}

impl Drop for TickerSlot {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Playback state machine for one activity's audio. Real playback follows the
/// media clock; when the media refuses to play, a 1 s counter stands in until
/// the fallback cap. Either way exactly one ticker drives the session.
#[derive(Clone)]
pub struct AudioPlaybackController {
    session: Arc<Mutex<AudioSession>>,
    media: Arc<Mutex<Box<dyn MediaElement>>>,
    ticker: Arc<TickerSlot>,
    config: PlaybackConfig,
}

impl AudioPlaybackController {
    pub fn new(
        resource_ref: impl Into<String>,
        media: Box<dyn MediaElement>,
        config: PlaybackConfig,
    ) -> Self {
        Self {
            session: Arc::new(Mutex::new(AudioSession::new(
                resource_ref,
                config.default_volume,
            ))),
            media: Arc::new(Mutex::new(media)),
            ticker: Arc::new(TickerSlot::default()),
            config,
        }
    }

    pub async fn snapshot(&self) -> PlaybackSnapshot {
        let session = self.session.lock().await;
        self.snapshot_of(&session)
    }

    /// Starts from `Idle`/`Paused`, restarts from `Ended`. A media failure
    /// switches to simulated mode instead of erroring.
    pub async fn play(&self) -> PlaybackSnapshot {
        let mut session = self.session.lock().await;
        if session.playing() {
            return self.snapshot_of(&session);
        }

        self.ticker.cancel();

        if session.status == PlaybackStatus::Ended {
            session.position_secs = 0.0;
        }

        let mode = {
            let mut media = self.media.lock().await;
            media.set_volume(session.volume);
            media.set_current_time(session.position_secs);
            match media.play().await {
                Ok(()) => {
                    if let Some(duration) = media.duration() {
                        session.set_duration(duration);
                    }
                    PlaybackMode::Real
                }
                Err(err) => {
                    info!(
                        "Playback of {} unavailable, simulating: {err:#}",
                        session.resource_ref
                    );
                    PlaybackMode::Simulated
                }
            }
        };

        session.begin(mode);
        self.spawn_ticker(session.generation);

        self.snapshot_of(&session)
    }

    /// Freezes position. No-op unless playing.
    pub async fn pause(&self) -> PlaybackSnapshot {
        let mut session = self.session.lock().await;
        if session.playing() {
            self.ticker.cancel();
            if session.mode == PlaybackMode::Real {
                let mut media = self.media.lock().await;
                media.pause();
                let (current, duration) = (media.current_time(), media.duration());
                session.sync_media(current, duration, self.config.cap_secs());
            }
            session.pause();
        }
        self.snapshot_of(&session)
    }

    /// Rewinds to 0 from any state and stops any ticker before returning.
    pub async fn reset(&self) -> PlaybackSnapshot {
        let mut session = self.session.lock().await;
        self.ticker.cancel();
        {
            let mut media = self.media.lock().await;
            media.pause();
            media.set_current_time(0.0);
        }
        session.reset();
        self.snapshot_of(&session)
    }

    pub async fn toggle_play(&self) -> PlaybackSnapshot {
        let playing = self.session.lock().await.playing();
        if playing {
            self.pause().await
        } else {
            self.play().await
        }
    }

    /// Clamps to [0, 1] and applies immediately in any state.
    pub async fn set_volume(&self, volume: f32) -> f32 {
        let mut session = self.session.lock().await;
        let applied = session.set_volume(volume);
        self.media.lock().await.set_volume(applied);
        applied
    }

    /// Feeds a pushed media notification into the session.
    pub async fn on_media_event(&self, event: MediaEvent) {
        let mut session = self.session.lock().await;
        match event {
            MediaEvent::LoadedMetadata(duration) => session.set_duration(duration),
            MediaEvent::TimeUpdate(current) => {
                if session.playing() && session.mode == PlaybackMode::Real {
                    let ended = session.sync_media(current, None, self.config.cap_secs());
                    if ended {
                        self.ticker.cancel();
                        info!("Playback of {} ended", session.resource_ref);
                    }
                }
            }
            MediaEvent::Ended => {
                if session.playing() && session.mode == PlaybackMode::Real {
                    self.ticker.cancel();
                    if session.duration_secs > 0.0 {
                        session.position_secs = session.duration_secs;
                    }
                    session.finish();
                    info!("Playback of {} ended", session.resource_ref);
                }
            }
        }
    }

    /// Tears the session down when its activity goes away.
    pub async fn close(&self) {
        self.reset().await;
    }

    pub async fn resource_ref(&self) -> String {
        self.session.lock().await.resource_ref.clone()
    }

    fn snapshot_of(&self, session: &AudioSession) -> PlaybackSnapshot {
        PlaybackSnapshot {
            progress_percent: session.progress_percent(),
            elapsed: format_clock(session.position_secs),
            total: format_clock(session.display_duration(self.config.cap_secs())),
            session: session.clone(),
        }
    }

    fn spawn_ticker(&self, generation: u64) {
        let session = self.session.clone();
        let media = self.media.clone();
        let period = self.config.tick_interval;
        let cap = self.config.cap_secs();
        let verbose = self.config.verbose_ticks;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(time::Instant::now() + period, period);
            loop {
                interval.tick().await;

                let mut guard = session.lock().await;
                if guard.generation != generation || !guard.playing() {
                    break;
                }

                let ended = match guard.mode {
                    PlaybackMode::Simulated => guard.advance_simulated(cap),
                    PlaybackMode::Real => {
                        let mut media = media.lock().await;
                        let (current, duration) = (media.current_time(), media.duration());
                        let ended = guard.sync_media(current, duration, cap);
                        if ended {
                            media.pause();
                        }
                        ended
                    }
                };

                if verbose {
                    log_debug!(
                        "{} at {:.1}s ({:?})",
                        guard.resource_ref,
                        guard.position_secs,
                        guard.mode
                    );
                }

                if ended {
                    info!(
                        "Playback of {} ended at {}",
                        guard.resource_ref,
                        format_clock(guard.position_secs)
                    );
                    break;
                }
            }
        });

        self.ticker.replace(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::media::SilentMedia;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;

    #[derive(Default)]
    struct Clock {
        current: f64,
        duration: Option<f64>,
        volume: f32,
        plays: u32,
        pauses: u32,
    }

    /// Media whose clock the test moves by hand.
    struct ManualMedia {
        clock: Arc<StdMutex<Clock>>,
        fail: bool,
    }

    #[async_trait]
    impl MediaElement for ManualMedia {
        async fn play(&mut self) -> Result<()> {
            if self.fail {
                return Err(anyhow!("decode error"));
            }
            self.clock.lock().unwrap().plays += 1;
            Ok(())
        }

        fn pause(&mut self) {
            self.clock.lock().unwrap().pauses += 1;
        }

        fn current_time(&self) -> f64 {
            self.clock.lock().unwrap().current
        }

        fn set_current_time(&mut self, secs: f64) {
            self.clock.lock().unwrap().current = secs;
        }

        fn duration(&self) -> Option<f64> {
            self.clock.lock().unwrap().duration
        }

        fn set_volume(&mut self, volume: f32) {
            self.clock.lock().unwrap().volume = volume;
        }
    }

    fn simulated(cap: u32) -> AudioPlaybackController {
        AudioPlaybackController::new(
            "audio/missing.mp3",
            Box::new(SilentMedia::new("missing")),
            PlaybackConfig {
                fallback_cap_secs: cap,
                ..PlaybackConfig::default()
            },
        )
    }

    fn real() -> (AudioPlaybackController, Arc<StdMutex<Clock>>) {
        let clock = Arc::new(StdMutex::new(Clock::default()));
        let controller = AudioPlaybackController::new(
            "audio/meditation.mp3",
            Box::new(ManualMedia {
                clock: clock.clone(),
                fail: false,
            }),
            PlaybackConfig::default(),
        );
        (controller, clock)
    }

    /// Lets the paused clock run; ticks land on whole seconds, so the extra
    /// half second settles the last one.
    async fn run_for(secs: u64) {
        time::sleep(Duration::from_millis(secs * 1000 + 500)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn failing_media_falls_back_to_simulated_ticks() {
        let controller = simulated(DEFAULT_FALLBACK_CAP_SECS);

        let started = controller.play().await;
        assert_eq!(started.session.status, PlaybackStatus::Playing);
        assert_eq!(started.session.mode, PlaybackMode::Simulated);
        assert_eq!(started.session.position_secs, 0.0);

        run_for(1).await;
        assert_eq!(controller.snapshot().await.session.position_secs, 1.0);

        run_for(2).await;
        assert_eq!(controller.snapshot().await.session.position_secs, 3.0);
    }

    #[tokio::test(start_paused = true)]
    async fn simulated_playback_ends_at_default_cap() {
        let controller = simulated(DEFAULT_FALLBACK_CAP_SECS);
        controller.play().await;

        run_for(310).await;
        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.session.status, PlaybackStatus::Ended);
        assert_eq!(snapshot.session.position_secs, 300.0);
        assert_eq!(snapshot.total, "5:00");

        let restarted = controller.play().await;
        assert_eq!(restarted.session.position_secs, 0.0);
        assert!(restarted.session.playing());
    }

    #[tokio::test(start_paused = true)]
    async fn reset_mid_tick_stops_the_counter() {
        let controller = simulated(DEFAULT_FALLBACK_CAP_SECS);
        controller.play().await;
        run_for(4).await;

        let after_reset = controller.reset().await;
        assert_eq!(after_reset.session.position_secs, 0.0);
        assert!(!after_reset.session.playing());

        run_for(5).await;
        let later = controller.snapshot().await;
        assert_eq!(later.session.position_secs, 0.0);
        assert_eq!(later.session.status, PlaybackStatus::Paused);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_freezes_and_resume_continues() {
        let controller = simulated(DEFAULT_FALLBACK_CAP_SECS);
        controller.play().await;
        run_for(2).await;

        let paused = controller.pause().await;
        assert_eq!(paused.session.status, PlaybackStatus::Paused);
        run_for(5).await;
        assert_eq!(controller.snapshot().await.session.position_secs, 2.0);

        controller.play().await;
        run_for(1).await;
        assert_eq!(controller.snapshot().await.session.position_secs, 3.0);
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_play_keeps_a_single_ticker() {
        let controller = simulated(DEFAULT_FALLBACK_CAP_SECS);
        controller.play().await;
        controller.play().await;
        controller.pause().await;
        controller.play().await;

        run_for(3).await;
        assert_eq!(controller.snapshot().await.session.position_secs, 3.0);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_from_idle_stays_idle() {
        let controller = simulated(DEFAULT_FALLBACK_CAP_SECS);
        let snapshot = controller.reset().await;
        assert_eq!(snapshot.session.status, PlaybackStatus::Idle);
        assert_eq!(snapshot.session.position_secs, 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn real_playback_follows_the_media_clock() {
        let (controller, clock) = real();
        let started = controller.play().await;
        assert_eq!(started.session.mode, PlaybackMode::Real);
        assert_eq!(clock.lock().unwrap().plays, 1);

        {
            let mut clock = clock.lock().unwrap();
            clock.current = 5.0;
            clock.duration = Some(10.0);
        }
        run_for(1).await;
        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.session.position_secs, 5.0);
        assert_eq!(snapshot.session.duration_secs, 10.0);
        assert_eq!(snapshot.progress_percent, 50.0);

        clock.lock().unwrap().current = 10.0;
        run_for(1).await;
        let ended = controller.snapshot().await;
        assert_eq!(ended.session.status, PlaybackStatus::Ended);
        assert!(clock.lock().unwrap().pauses >= 1);
    }

    #[tokio::test(start_paused = true)]
    async fn pushed_media_events_update_the_session() {
        let (controller, _clock) = real();
        controller.play().await;

        controller.on_media_event(MediaEvent::LoadedMetadata(120.0)).await;
        controller.on_media_event(MediaEvent::TimeUpdate(30.0)).await;
        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.session.duration_secs, 120.0);
        assert_eq!(snapshot.session.position_secs, 30.0);
        assert_eq!(snapshot.elapsed, "0:30");

        controller.on_media_event(MediaEvent::Ended).await;
        let ended = controller.snapshot().await;
        assert_eq!(ended.session.status, PlaybackStatus::Ended);
        assert_eq!(ended.session.position_secs, 120.0);
    }

    #[tokio::test(start_paused = true)]
    async fn volume_is_clamped_and_forwarded() {
        let (controller, clock) = real();
        assert_eq!(controller.set_volume(1.8).await, 1.0);
        assert_eq!(clock.lock().unwrap().volume, 1.0);
        assert_eq!(controller.set_volume(-2.0).await, 0.0);

        controller.play().await;
        assert_eq!(controller.set_volume(0.3).await, 0.3);
        assert!(controller.snapshot().await.session.playing());
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_alternates_play_and_pause() {
        let controller = simulated(DEFAULT_FALLBACK_CAP_SECS);
        assert!(controller.toggle_play().await.session.playing());
        assert!(!controller.toggle_play().await.session.playing());
    }

    #[tokio::test(start_paused = true)]
    async fn failing_real_media_is_never_an_error() {
        let clock = Arc::new(StdMutex::new(Clock::default()));
        let controller = AudioPlaybackController::new(
            "audio/broken.mp3",
            Box::new(ManualMedia {
                clock: clock.clone(),
                fail: true,
            }),
            PlaybackConfig {
                fallback_cap_secs: 3,
                ..PlaybackConfig::default()
            },
        );
        controller.play().await;
        run_for(5).await;
        let snapshot = controller.snapshot().await;
        assert_eq!(snapshot.session.mode, PlaybackMode::Simulated);
        assert_eq!(snapshot.session.status, PlaybackStatus::Ended);
        assert_eq!(snapshot.session.position_secs, 3.0);
    }
}
