pub mod controller;
pub mod media;
#[cfg(feature = "speaker")]
pub mod rodio_backend;
pub mod state;

pub use controller::{AudioPlaybackController, PlaybackConfig, PlaybackSnapshot};
pub use media::{MediaElement, MediaEvent, MediaSource, NoOutput, SilentMedia};
#[cfg(feature = "speaker")]
pub use rodio_backend::RodioSource;
pub use state::{AudioSession, PlaybackMode, PlaybackStatus};
