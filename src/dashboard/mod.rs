//! Wellness dashboard numbers, recomputed from the mood history on every read.

use std::collections::HashSet;

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use crate::{
    db::{MoodEntry, MoodValue},
    mood::MoodStateStore,
};

const WINDOW_DAYS: i64 = 7;
const HIGH_RISK_AVERAGE: f64 = 2.5;
const LOW_RISK_AVERAGE: f64 = 3.5;
const LOW_MOOD_MAX: u8 = 2;
const LOW_MOOD_SHARE: f64 = 0.5;
const RECENT_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum WeeklyAverage {
    Value(f64),
    InsufficientData,
}

impl WeeklyAverage {
    pub fn value(&self) -> Option<f64> {
        match self {
            WeeklyAverage::Value(avg) => Some(*avg),
            WeeklyAverage::InsufficientData => None,
        }
    }
}

/// Heuristic trend bucket; not a clinical assessment.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecentMood {
    pub mood: MoodValue,
    pub label: &'static str,
    pub emoji: &'static str,
    /// "Today", "Yesterday" or "N days ago".
    pub when: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub weekly_average: WeeklyAverage,
    pub streak_days: u32,
    pub total_check_ins: usize,
    pub risk_level: RiskLevel,
    pub recent_moods: Vec<RecentMood>,
}

/// Metrics for `history` as seen at `now`; calendar days follow `now`'s zone.
pub fn compute_metrics<Tz: TimeZone>(history: &[MoodEntry], now: &DateTime<Tz>) -> DashboardMetrics {
    let now_utc = now.with_timezone(&Utc);
    let window_start = now_utc - Duration::days(WINDOW_DAYS);
    let trailing: Vec<MoodValue> = history
        .iter()
        .filter(|entry| entry.timestamp >= window_start && entry.timestamp <= now_utc)
        .map(|entry| entry.mood)
        .collect();

    let weekly_average = weekly_average(&trailing);

    DashboardMetrics {
        weekly_average,
        streak_days: streak_days(history, now),
        total_check_ins: month_check_ins(history, now),
        risk_level: risk_level(weekly_average, &trailing),
        recent_moods: recent_moods(history, now),
    }
}

fn weekly_average(trailing: &[MoodValue]) -> WeeklyAverage {
    if trailing.is_empty() {
        return WeeklyAverage::InsufficientData;
    }
    let sum: u32 = trailing.iter().map(|mood| mood.get() as u32).sum();
    WeeklyAverage::Value(sum as f64 / trailing.len() as f64)
}

/// High wins when both the high and low rules apply.
pub fn risk_level(average: WeeklyAverage, trailing: &[MoodValue]) -> RiskLevel {
    let Some(avg) = average.value() else {
        return RiskLevel::Low;
    };

    let low_count = trailing
        .iter()
        .filter(|mood| mood.get() <= LOW_MOOD_MAX)
        .count();
    let low_share = low_count as f64 / trailing.len().max(1) as f64;

    if avg < HIGH_RISK_AVERAGE || low_share >= LOW_MOOD_SHARE {
        RiskLevel::High
    } else if avg >= LOW_RISK_AVERAGE {
        RiskLevel::Low
    } else {
        RiskLevel::Medium
    }
}

fn local_day<Tz: TimeZone>(entry: &MoodEntry, tz: &Tz) -> NaiveDate {
    entry.timestamp.with_timezone(tz).date_naive()
}

/// Consecutive days with a check-in, counting back from today. A day without
/// one (today included) ends the run.
fn streak_days<Tz: TimeZone>(history: &[MoodEntry], now: &DateTime<Tz>) -> u32 {
    let tz = now.timezone();
    let days: HashSet<NaiveDate> = history.iter().map(|entry| local_day(entry, &tz)).collect();

    let mut day = now.date_naive();
    let mut streak = 0;
    while days.contains(&day) {
        streak += 1;
        match day.pred_opt() {
            Some(previous) => day = previous,
            None => break,
        }
    }
    streak
}

fn month_check_ins<Tz: TimeZone>(history: &[MoodEntry], now: &DateTime<Tz>) -> usize {
    let tz = now.timezone();
    let today = now.date_naive();
    history
        .iter()
        .map(|entry| local_day(entry, &tz))
        .filter(|day| day.year() == today.year() && day.month() == today.month())
        .count()
}

fn recent_moods<Tz: TimeZone>(history: &[MoodEntry], now: &DateTime<Tz>) -> Vec<RecentMood> {
    let tz = now.timezone();
    let today = now.date_naive();
    history
        .iter()
        .rev()
        .take(RECENT_LIMIT)
        .map(|entry| RecentMood {
            mood: entry.mood,
            label: entry.mood.label(),
            emoji: entry.mood.emoji(),
            when: relative_day(today, local_day(entry, &tz)),
        })
        .collect()
}

fn relative_day(today: NaiveDate, day: NaiveDate) -> String {
    match (today - day).num_days() {
        n if n <= 0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        n => format!("{n} days ago"),
    }
}

/// Reads the live mood store; nothing is cached between calls.
#[derive(Clone)]
pub struct DashboardAggregator {
    store: MoodStateStore,
}

impl DashboardAggregator {
    pub fn new(store: MoodStateStore) -> Self {
        Self { store }
    }

    pub async fn metrics(&self) -> DashboardMetrics {
        self.metrics_at(&Local::now()).await
    }

    pub async fn metrics_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DashboardMetrics {
        let history = self.store.get_history(None).await;
        compute_metrics(&history, now)
    }
}
