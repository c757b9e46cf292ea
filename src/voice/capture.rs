use std::collections::VecDeque;

use anyhow::{bail, Result};
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::notify::{Notifier, Severity};

use super::buffer::VoiceCaptureBuffer;

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    Fragment { text: String, is_final: bool },
    End,
}

/// Speech-to-text capability. Must be checked with `is_available` before use.
#[async_trait]
pub trait SpeechCapture: Send {
    fn is_available(&self) -> bool;

    async fn start(&mut self) -> Result<mpsc::Receiver<SpeechEvent>>;

    async fn stop(&mut self);
}

/// Platform without speech recognition.
pub struct NoSpeech;

#[async_trait]
impl SpeechCapture for NoSpeech {
    fn is_available(&self) -> bool {
        false
    }

    async fn start(&mut self) -> Result<mpsc::Receiver<SpeechEvent>> {
        bail!("speech recognition is not supported")
    }

    async fn stop(&mut self) {}
}

/// Replays a fixed list of fragments, then ends. The shell feeds typed text
/// through it in place of a microphone.
pub struct ScriptedSpeech {
    fragments: VecDeque<(String, bool)>,
}

impl ScriptedSpeech {
    pub fn new<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = (S, bool)>,
        S: Into<String>,
    {
        Self {
            fragments: fragments
                .into_iter()
                .map(|(text, is_final)| (text.into(), is_final))
                .collect(),
        }
    }
}

#[async_trait]
impl SpeechCapture for ScriptedSpeech {
    fn is_available(&self) -> bool {
        true
    }

    async fn start(&mut self) -> Result<mpsc::Receiver<SpeechEvent>> {
        let (tx, rx) = mpsc::channel(self.fragments.len() + 1);
        for (text, is_final) in self.fragments.drain(..) {
            let _ = tx.send(SpeechEvent::Fragment { text, is_final }).await;
        }
        let _ = tx.send(SpeechEvent::End).await;
        Ok(rx)
    }

    async fn stop(&mut self) {}
}

/// Runs one capture session into `buffer` until the recognizer ends or
/// `cancel` fires, and returns the buffer's contents. An absent or failing
/// capability disables voice for the session with a single notice.
pub async fn capture(
    buffer: &mut VoiceCaptureBuffer,
    speech: &mut dyn SpeechCapture,
    notifier: &dyn Notifier,
    cancel: CancellationToken,
) -> String {
    if !buffer.is_available() {
        return String::new();
    }

    if !speech.is_available() {
        disable(buffer, notifier);
        return String::new();
    }

    let mut events = match speech.start().await {
        Ok(rx) => rx,
        Err(err) => {
            log_error!("speech capture failed to start: {err:#}");
            disable(buffer, notifier);
            return String::new();
        }
    };

    let mut fragments = 0usize;
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(SpeechEvent::Fragment { text, is_final }) => {
                    buffer.on_fragment(&text, is_final);
                    fragments += 1;
                }
                Some(SpeechEvent::End) | None => break,
            },
            _ = cancel.cancelled() => {
                log_info!("speech capture cancelled");
                break;
            }
        }
    }

    speech.stop().await;
    log_info!("speech capture finished after {fragments} fragments");
    buffer.commit()
}

fn disable(buffer: &mut VoiceCaptureBuffer, notifier: &dyn Notifier) {
    if buffer.disable() {
        notifier.notify(
            "Voice input unavailable",
            "Speech recognition isn't supported here. You can still type your notes.",
            Severity::Info,
        );
    }
}
