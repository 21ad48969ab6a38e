use serde::{Deserialize, Serialize};

/// Key of the synthetic category that disables filtering
pub const ALL_CATEGORY_KEY: &str = "all";

/// Machine key assigned to audio rows without a category
pub const UNCATEGORIZED_KEY: &str = "other";

/// A playable guided-audio session with its category resolved for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioItem {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Nominal duration in seconds
    pub duration_secs: u64,
    /// Stable machine key, used for filtering
    pub category_key: String,
    /// Human-readable category, used for display
    pub category_label: String,
    pub difficulty: String,
    pub cover_url: String,
    pub media_url: String,
}

impl AudioItem {
    /// Nominal duration as "<minutes>分钟"
    pub fn duration_label(&self) -> String {
        format!("{}分钟", self.duration_secs / 60)
    }
}

/// Category lookup entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub title: String,
    pub key: String,
    pub sort_order: Option<i32>,
}

impl Category {
    /// The synthetic "all" tab shown first in the category list
    pub fn all() -> Self {
        Self {
            id: ALL_CATEGORY_KEY.to_string(),
            title: "全部".to_string(),
            key: ALL_CATEGORY_KEY.to_string(),
            sort_order: None,
        }
    }

    pub fn is_all(&self) -> bool {
        self.key == ALL_CATEGORY_KEY
    }
}

/// Format seconds as "MM:SS"; negative or non-finite values render as "00:00"
pub fn format_clock(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "00:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}
