use serde::{Deserialize, Serialize};

use crate::catalog::AudioItem;

/// Navigation target emitted by a view, carrying the next screen's parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum Route {
    /// Pop back to the previous screen
    Back,
    AudioList,
    AudioPlay {
        audio: AudioItem,
    },
    /// Post-practice self-report entry
    RecordEntry {
        audio_id: Option<String>,
        practice_duration_seconds: Option<u64>,
    },
    RecordHistory,
    ReminderSettings,
}
