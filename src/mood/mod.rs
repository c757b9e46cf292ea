pub mod store;

pub use store::MoodStateStore;
