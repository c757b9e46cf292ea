//! Static activity catalog. Loaded once at startup and never mutated.

mod builtin;

use std::{cmp::Ordering, collections::HashSet, fs, path::Path};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::db::MoodValue;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Difficulty {
    Easy,
    Medium,
    Challenging,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Challenging => "challenging",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub duration: String,
    pub difficulty: Difficulty,
    pub mood_tags: Vec<MoodValue>,
    /// Resource reference for activities with a guided audio track.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
}

impl Activity {
    pub fn matches(&self, mood: MoodValue) -> bool {
        self.mood_tags.contains(&mood)
    }

    /// Smallest `|tag - mood|` over this activity's tags; `None` when untagged.
    pub fn tag_distance(&self, mood: MoodValue) -> Option<u8> {
        self.mood_tags.iter().map(|tag| tag.distance(mood)).min()
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    activities: Vec<Activity>,
}

impl Catalog {
    /// Builds a catalog, rejecting duplicate ids. An empty list is accepted;
    /// selection reports it as a configuration error.
    pub fn new(mut activities: Vec<Activity>) -> Result<Self> {
        let mut seen = HashSet::new();
        for activity in &activities {
            if !seen.insert(activity.id.as_str()) {
                bail!("duplicate activity id {}", activity.id);
            }
        }
        activities.sort_by(|a, b| compare_ids(&a.id, &b.id));
        Ok(Self { activities })
    }

    pub fn builtin() -> Self {
        Self {
            activities: builtin::activities(),
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog from {}", path.display()))?;
        let activities: Vec<Activity> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse catalog {}", path.display()))?;
        Self::new(activities)
    }

    pub fn get(&self, id: &str) -> Option<&Activity> {
        self.activities.iter().find(|activity| activity.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Activities in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Activity> {
        self.activities.iter()
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }
}

/// Numeric ids compare as numbers ("2" < "10"); anything else falls back to
/// plain string order, with numeric ids first.
pub fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}
