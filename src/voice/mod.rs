pub mod buffer;
pub mod capture;

pub use buffer::VoiceCaptureBuffer;
pub use capture::{capture, NoSpeech, ScriptedSpeech, SpeechCapture, SpeechEvent};
