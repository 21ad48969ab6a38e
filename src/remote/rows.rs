use serde::{Deserialize, Serialize};

/// Row of the `categories` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryRow {
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub sort_order: Option<i32>,
}

/// Row of the `audios` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AudioRow {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub duration: Option<u64>,
    pub category: Option<String>,
    pub cover_url: Option<String>,
    pub difficulty: Option<String>,
}

/// Row of `study_audio_map` with the `audios` relation embedded
///
/// The embedded audio is null when the mapping points at a missing row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StudyAudioRow {
    #[serde(default)]
    pub audio_id: Option<i64>,
    pub audios: Option<AudioRow>,
}

/// Row of the `study_codes` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StudyCodeRow {
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Insert payload for the `practice_logs` table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PracticeLogRow {
    pub user_uuid: String,
    pub subject_id: Option<String>,
    pub study_code: String,
    pub audio_id: Option<i64>,
    /// Practice duration in whole seconds
    pub duration: u64,
    pub anxiety_rating: u8,
    pub description: String,
    /// Tags joined with ','
    pub tags: String,
    pub created_at: String, // RFC3339 timestamp
}
