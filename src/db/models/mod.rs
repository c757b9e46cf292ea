pub mod completion;
pub mod mood_entry;

pub use completion::CompletionRecord;
pub use mood_entry::{EntrySource, MoodEntry, MoodValue};
