//! Practice records
//!
//! Post-practice self-reports: drafting, saving (local list + remote mirror),
//! history rows and practice statistics.

mod history;
mod model;
mod service;

pub use history::{EntryIcon, HistoryEntry, PracticeStats, WeekProgress, MIN_VALID_MINUTES};
pub use model::{
    PracticeRecord, RecordDraft, VasBand, DEFAULT_ANXIETY_RATING, MAX_DESCRIPTION_CHARS,
    QUICK_TAGS,
};
pub use service::RecordService;
