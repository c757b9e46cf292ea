//! Speaker output through rodio. The output stream is not `Send`, so each
//! element drives a dedicated thread over a command channel.

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{self, RecvTimeoutError, Sender},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use rodio::{Decoder, OutputStream, Sink, Source};
use tokio::sync::oneshot;

use super::media::{MediaElement, MediaSource};

const ENABLE_LOGS: bool = true;

use crate::log_warn;

const DRAIN_POLL: Duration = Duration::from_millis(250);

enum RodioCommand {
    Load {
        path: PathBuf,
        reply: oneshot::Sender<Result<Option<Duration>, String>>,
    },
    Play,
    Pause,
    Seek(Duration),
    SetVolume(f32),
    Stop,
}

/// Opens files relative to the audio asset directory.
pub struct RodioSource {
    base_dir: PathBuf,
}

impl RodioSource {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

impl MediaSource for RodioSource {
    fn open(&self, resource_ref: &str) -> Box<dyn MediaElement> {
        Box::new(RodioMedia::new(self.base_dir.join(resource_ref)))
    }
}

pub struct RodioMedia {
    path: PathBuf,
    tx: Option<Sender<RodioCommand>>,
    drained: Arc<AtomicBool>,
    loaded: bool,
    duration: Option<f64>,
    volume: f32,
    /// Position at the last play/pause/seek; `anchor` adds wall time since.
    baseline: f64,
    anchor: Option<Instant>,
}

impl RodioMedia {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            tx: None,
            drained: Arc::new(AtomicBool::new(false)),
            loaded: false,
            duration: None,
            volume: 1.0,
            baseline: 0.0,
            anchor: None,
        }
    }

    fn ensure_thread(&mut self) -> Result<Sender<RodioCommand>> {
        if let Some(tx) = self.tx.as_ref() {
            return Ok(tx.clone());
        }

        let (tx, rx) = mpsc::channel::<RodioCommand>();
        let drained = Arc::clone(&self.drained);

        thread::Builder::new()
            .name("mindwell-audio".to_string())
            .spawn(move || {
                let mut stream: Option<OutputStream> = None;
                let mut sink: Option<Sink> = None;

                loop {
                    let cmd = match rx.recv_timeout(DRAIN_POLL) {
                        Ok(cmd) => cmd,
                        Err(RecvTimeoutError::Timeout) => {
                            if let Some(ref s) = sink {
                                if !s.is_paused() && s.empty() {
                                    drained.store(true, Ordering::SeqCst);
                                }
                            }
                            continue;
                        }
                        Err(RecvTimeoutError::Disconnected) => break,
                    };

                    match cmd {
                        RodioCommand::Load { path, reply } => {
                            if let Some(old) = sink.take() {
                                old.stop();
                            }
                            stream = None;
                            drained.store(false, Ordering::SeqCst);
                            let result = load(&path, &mut stream, &mut sink);
                            let _ = reply.send(result.map_err(|e| format!("{e:#}")));
                        }
                        RodioCommand::Play => {
                            if let Some(ref s) = sink {
                                s.play();
                            }
                        }
                        RodioCommand::Pause => {
                            if let Some(ref s) = sink {
                                s.pause();
                            }
                        }
                        RodioCommand::Seek(position) => {
                            if let Some(ref s) = sink {
                                if let Err(err) = s.try_seek(position) {
                                    log_warn!("Audio seek failed: {err}");
                                }
                            }
                        }
                        RodioCommand::SetVolume(v) => {
                            if let Some(ref s) = sink {
                                s.set_volume(v.clamp(0.0, 1.0));
                            }
                        }
                        RodioCommand::Stop => {
                            if let Some(old) = sink.take() {
                                old.stop();
                            }
                            stream = None;
                        }
                    }
                }

                drop(sink);
                drop(stream);
            })
            .context("failed to spawn audio thread")?;

        self.tx = Some(tx.clone());
        Ok(tx)
    }

    fn send(&self, cmd: RodioCommand) {
        if let Some(tx) = self.tx.as_ref() {
            let _ = tx.send(cmd);
        }
    }

    fn elapsed(&self) -> f64 {
        let running = self
            .anchor
            .map(|anchor| anchor.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        let position = self.baseline + running;
        match self.duration {
            Some(duration) => position.min(duration),
            None => position,
        }
    }
}

fn load(
    path: &Path,
    stream: &mut Option<OutputStream>,
    sink: &mut Option<Sink>,
) -> Result<Option<Duration>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let decoder = Decoder::new(BufReader::new(file))
        .with_context(|| format!("failed to decode {}", path.display()))?;
    let duration = decoder.total_duration();

    let (new_stream, handle) =
        OutputStream::try_default().context("failed to create audio output stream")?;
    let new_sink = Sink::try_new(&handle).context("failed to create audio sink")?;
    new_sink.pause();
    new_sink.append(decoder);

    *stream = Some(new_stream);
    *sink = Some(new_sink);
    Ok(duration)
}

#[async_trait]
impl MediaElement for RodioMedia {
    async fn play(&mut self) -> Result<()> {
        let tx = self.ensure_thread()?;

        if !self.loaded || self.drained.load(Ordering::SeqCst) {
            let (reply, response) = oneshot::channel();
            tx.send(RodioCommand::Load {
                path: self.path.clone(),
                reply,
            })
            .map_err(|_| anyhow!("audio thread stopped"))?;
            let duration = response
                .await
                .map_err(|_| anyhow!("audio thread stopped"))?
                .map_err(|e| anyhow!(e))?;
            self.duration = duration.map(|d| d.as_secs_f64());
            self.loaded = true;
        }

        self.send(RodioCommand::SetVolume(self.volume));
        if self.baseline > 0.0 {
            self.send(RodioCommand::Seek(Duration::from_secs_f64(self.baseline)));
        }
        self.send(RodioCommand::Play);
        self.anchor = Some(Instant::now());
        Ok(())
    }

    fn pause(&mut self) {
        self.baseline = self.elapsed();
        self.anchor = None;
        self.send(RodioCommand::Pause);
    }

    fn current_time(&self) -> f64 {
        self.elapsed()
    }

    fn set_current_time(&mut self, secs: f64) {
        self.baseline = secs.max(0.0);
        if self.anchor.is_some() {
            self.anchor = Some(Instant::now());
        }
        if self.loaded {
            self.send(RodioCommand::Seek(Duration::from_secs_f64(self.baseline)));
        }
    }

    /// Files without a length header report their length once drained.
    fn duration(&self) -> Option<f64> {
        self.duration.or_else(|| {
            self.drained
                .load(Ordering::SeqCst)
                .then(|| self.elapsed())
        })
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        self.send(RodioCommand::SetVolume(volume));
    }
}

impl Drop for RodioMedia {
    fn drop(&mut self) {
        self.send(RodioCommand::Stop);
    }
}
