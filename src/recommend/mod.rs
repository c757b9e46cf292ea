pub mod engine;
pub mod selection;

pub use engine::{Completion, RecommendationEngine};
pub use selection::{apply_exclusions, candidates_for_mood, select_goal};
