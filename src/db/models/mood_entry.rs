//! Mood check-in data models.
//!
//! - `MoodValue`: validated 1..=5 self-report
//! - `MoodEntry`, `EntrySource`: one immutable row of the mood history

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::WellnessError;

/// Self-reported mood, 1 (anxious) through 5 (great).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct MoodValue(u8);

impl MoodValue {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;
    pub const NEUTRAL: MoodValue = MoodValue(3);

    pub fn new(value: i64) -> Result<Self, WellnessError> {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&value) {
            Ok(MoodValue(value as u8))
        } else {
            Err(WellnessError::validation(format!(
                "mood value {value} is outside {}..={}",
                Self::MIN,
                Self::MAX
            )))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn distance(self, other: MoodValue) -> u8 {
        self.0.abs_diff(other.0)
    }

    pub fn label(self) -> &'static str {
        match self.0 {
            5 => "Great",
            4 => "Good",
            3 => "Okay",
            2 => "Low",
            _ => "Anxious",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self.0 {
            5 => "😊",
            4 => "🙂",
            3 => "😐",
            2 => "🙁",
            _ => "😰",
        }
    }
}

impl Default for MoodValue {
    fn default() -> Self {
        MoodValue::NEUTRAL
    }
}

impl TryFrom<i64> for MoodValue {
    type Error = WellnessError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        MoodValue::new(value)
    }
}

impl From<MoodValue> for i64 {
    fn from(value: MoodValue) -> Self {
        value.0 as i64
    }
}

impl fmt::Display for MoodValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum EntrySource {
    Manual,
    Voice,
}

impl EntrySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntrySource::Manual => "Manual",
            EntrySource::Voice => "Voice",
        }
    }
}

impl Default for EntrySource {
    fn default() -> Self {
        EntrySource::Manual
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MoodEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub mood: MoodValue,
    pub notes: String,
    pub source: EntrySource,
}

impl MoodEntry {
    pub fn new(
        mood: MoodValue,
        notes: impl Into<String>,
        source: EntrySource,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp,
            mood,
            notes: notes.into(),
            source,
        }
    }
}
