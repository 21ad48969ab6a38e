use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone};
use serde::Serialize;
use std::fmt;

use super::model::PracticeRecord;

/// Minimum whole minutes for a record to count as a completed practice
pub const MIN_VALID_MINUTES: u64 = 5;

const FREE_PRACTICE: &str = "自由练习";
const NO_FEELING: &str = "没有填写具体的感受。";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryIcon {
    /// Guided audio practice
    Headphones,
    /// Free-form entry without a timed practice
    Heart,
}

/// One row of the history list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub id: String,
    pub date: NaiveDate,
    pub time: String,
    pub duration_minutes: u64,
    pub anxiety_level: u8,
    pub practice_type: String,
    pub feeling: String,
    pub icon: EntryIcon,
}

impl HistoryEntry {
    pub fn from_record<Tz: TimeZone>(record: &PracticeRecord, tz: &Tz) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        let local = record.created_at.with_timezone(tz);
        let duration_minutes = record.duration_minutes.unwrap_or(0);

        Self {
            id: record.id.clone(),
            date: local.date_naive(),
            time: local.format("%H:%M").to_string(),
            duration_minutes,
            anxiety_level: record.anxiety_rating,
            practice_type: record
                .tags
                .first()
                .cloned()
                .unwrap_or_else(|| FREE_PRACTICE.to_string()),
            feeling: if record.description.is_empty() {
                NO_FEELING.to_string()
            } else {
                record.description.clone()
            },
            icon: if duration_minutes > 0 {
                EntryIcon::Headphones
            } else {
                EntryIcon::Heart
            },
        }
    }

    pub fn is_valid_practice(&self) -> bool {
        self.duration_minutes > MIN_VALID_MINUTES
    }
}

/// Monday-to-Sunday completion of the current week
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekProgress {
    pub completed_days: usize,
    pub total_days: usize,
    /// Index 0 is Monday
    pub daily_progress: [bool; 7],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PracticeStats {
    /// Records longer than the minimum practice length
    pub total_practice_count: usize,
    /// Minutes over all records
    pub total_practice_minutes: u64,
    pub week_progress: WeekProgress,
}

impl PracticeStats {
    /// Statistics as seen at `now`, with days taken in `now`'s timezone
    pub fn compute<Tz: TimeZone>(records: &[PracticeRecord], now: &DateTime<Tz>) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        let tz = now.timezone();
        let entries: Vec<HistoryEntry> = records
            .iter()
            .map(|record| HistoryEntry::from_record(record, &tz))
            .collect();

        let valid: Vec<&HistoryEntry> = entries.iter().filter(|e| e.is_valid_practice()).collect();
        let total_practice_minutes = entries.iter().map(|e| e.duration_minutes).sum();

        let today = now.date_naive();
        let monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);

        let mut daily_progress = [false; 7];
        for (offset, done) in daily_progress.iter_mut().enumerate() {
            let day = monday + Duration::days(offset as i64);
            *done = valid.iter().any(|e| e.date == day);
        }

        Self {
            total_practice_count: valid.len(),
            total_practice_minutes,
            week_progress: WeekProgress {
                completed_days: daily_progress.iter().filter(|d| **d).count(),
                total_days: 7,
                daily_progress,
            },
        }
    }
}
