use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};

use crate::db::models::{EntrySource, MoodValue};

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

pub fn parse_source(value: &str) -> Result<EntrySource> {
    match value {
        "Manual" => Ok(EntrySource::Manual),
        "Voice" => Ok(EntrySource::Voice),
        other => Err(anyhow!("unknown entry source {other}")),
    }
}

pub fn parse_mood(value: i64) -> Result<MoodValue> {
    MoodValue::new(value).map_err(|err| anyhow!("stored mood is invalid: {err}"))
}
