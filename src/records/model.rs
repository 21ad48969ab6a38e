use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Longest allowed feeling description, in characters
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// VAS value a new draft starts from
pub const DEFAULT_ANXIETY_RATING: u8 = 50;

/// Quick tags offered on the record-entry screen
pub const QUICK_TAGS: [&str; 6] = ["放松", "平静", "紧张", "焦虑", "专注", "活力"];

/// A saved post-practice self-report
///
/// Serialized with the field names the on-device list has always used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub display_time: String,
    /// Whole minutes of practice; null for a free-form entry
    #[serde(rename = "duration", default)]
    pub duration_minutes: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u64>,
    /// Anxiety VAS, 0–100
    pub anxiety_rating: u8,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Colour band of a VAS score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VasBand {
    Calm,
    Mild,
    Moderate,
    High,
}

impl VasBand {
    pub fn for_score(score: u8) -> Self {
        match score {
            0..=25 => VasBand::Calm,
            26..=50 => VasBand::Mild,
            51..=75 => VasBand::Moderate,
            _ => VasBand::High,
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            VasBand::Calm => "#10b981",
            VasBand::Mild => "#3b82f6",
            VasBand::Moderate => "#f59e0b",
            VasBand::High => "#ef4444",
        }
    }
}

/// Record being edited before save
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordDraft {
    pub audio_id: Option<String>,
    pub practice_duration_seconds: Option<u64>,
    anxiety_rating: u8,
    description: String,
    tags: Vec<String>,
}

impl Default for RecordDraft {
    fn default() -> Self {
        Self {
            audio_id: None,
            practice_duration_seconds: None,
            anxiety_rating: DEFAULT_ANXIETY_RATING,
            description: String::new(),
            tags: Vec::new(),
        }
    }
}

impl RecordDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draft opened from the playback screen
    pub fn for_practice(audio_id: Option<String>, practice_duration_seconds: Option<u64>) -> Self {
        Self {
            audio_id,
            practice_duration_seconds,
            ..Self::default()
        }
    }

    pub fn anxiety_rating(&self) -> u8 {
        self.anxiety_rating
    }

    /// Clamped to 0–100
    pub fn set_anxiety_rating(&mut self, rating: u32) {
        self.anxiety_rating = rating.min(100) as u8;
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Accepts the new text only if it fits the length limit
    pub fn set_description(&mut self, text: &str) -> bool {
        if text.chars().count() > MAX_DESCRIPTION_CHARS {
            return false;
        }
        self.description = text.to_string();
        true
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Select or deselect a tag, mirroring it as `#tag` in the description
    pub fn toggle_tag(&mut self, tag: &str) {
        let marker = format!("#{}", tag);

        if let Some(pos) = self.tags.iter().position(|t| t == tag) {
            self.tags.remove(pos);
            let cleaned: Vec<&str> = self
                .description
                .split_whitespace()
                .filter(|word| *word != marker)
                .collect();
            self.description = cleaned.join(" ");
        } else {
            self.tags.push(tag.to_string());
            let current = self.description.trim();
            let text = if current.is_empty() {
                marker
            } else {
                format!("{} {}", current, marker)
            };
            if text.chars().count() <= MAX_DESCRIPTION_CHARS {
                self.description = text;
            }
        }
    }

    /// Select a tag without ever deselecting it; the `#tag` marker is
    /// appended only when the description does not carry it yet
    pub fn select_tag(&mut self, tag: &str) {
        if self.tags.iter().any(|t| t == tag) {
            return;
        }
        self.tags.push(tag.to_string());

        let marker = format!("#{}", tag);
        if self.description.split_whitespace().any(|word| word == marker) {
            return;
        }
        let current = self.description.trim();
        let text = if current.is_empty() {
            marker
        } else {
            format!("{} {}", current, marker)
        };
        if text.chars().count() <= MAX_DESCRIPTION_CHARS {
            self.description = text;
        }
    }

    /// Whole minutes carried to the saved record
    pub fn duration_minutes(&self) -> Option<u64> {
        self.practice_duration_seconds.map(|secs| secs / 60)
    }

    pub fn vas_band(&self) -> VasBand {
        VasBand::for_score(self.anxiety_rating)
    }

    /// Freeze the draft into a record created at `now`
    pub fn into_record(self, now: DateTime<Utc>) -> PracticeRecord {
        let duration_minutes = self.duration_minutes();
        PracticeRecord {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: now,
            display_time: now
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M")
                .to_string(),
            duration_minutes,
            duration_seconds: self.practice_duration_seconds,
            anxiety_rating: self.anxiety_rating,
            description: self.description,
            tags: self.tags,
        }
    }
}
