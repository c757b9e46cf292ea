use anyhow::{Context, Result};
use rusqlite::{params, Row};

use crate::db::{
    helpers::{parse_datetime, parse_mood, parse_source},
    models::MoodEntry,
    Database,
};

fn row_to_entry(row: &Row) -> Result<MoodEntry> {
    let recorded_at: String = row.get("recorded_at")?;
    let source: String = row.get("source")?;

    Ok(MoodEntry {
        id: row.get("id")?,
        timestamp: parse_datetime(&recorded_at, "recorded_at")?,
        mood: parse_mood(row.get("mood")?)?,
        notes: row.get("notes")?,
        source: parse_source(&source)?,
    })
}

impl Database {
    pub async fn insert_mood_entry(&self, entry: &MoodEntry) -> Result<()> {
        let record = entry.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO mood_entries (id, recorded_at, mood, notes, source)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.id,
                    record.timestamp.to_rfc3339(),
                    i64::from(record.mood),
                    record.notes,
                    record.source.as_str(),
                ],
            )
            .with_context(|| "failed to insert mood entry")?;
            Ok(())
        })
        .await
    }

    /// Entries in insertion order. `seq` is the autoincrement key, so clock
    /// adjustments between check-ins cannot reorder the history.
    pub async fn list_mood_entries(&self) -> Result<Vec<MoodEntry>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, recorded_at, mood, notes, source
                 FROM mood_entries
                 ORDER BY seq ASC",
            )?;

            let mut rows = stmt.query([])?;
            let mut entries = Vec::new();
            while let Some(row) = rows.next()? {
                entries.push(row_to_entry(row)?);
            }

            Ok(entries)
        })
        .await
    }
}
