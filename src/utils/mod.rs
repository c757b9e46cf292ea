pub mod logging;

pub use logging::debug_enabled;
