use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One finished goal. Duplicates are allowed: completing the same goal twice
/// produces two records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRecord {
    pub goal_id: String,
    pub completed_at: DateTime<Utc>,
}
