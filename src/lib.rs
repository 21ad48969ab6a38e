pub mod alert;
pub mod app;
pub mod catalog;
pub mod cohort;
pub mod config;
pub mod http;
pub mod local;
pub mod navigation;
pub mod playback;
pub mod records;
pub mod reminder;
pub mod remote;

pub use alert::Alert;
pub use app::App;
pub use catalog::{AudioItem, CatalogResolver, CatalogSnapshot, CatalogView, Category};
pub use cohort::{CohortService, CohortUpdate};
pub use config::Config;
pub use http::{create_router, AppState};
pub use local::{FileKvStore, KeyValueStore, MemoryKvStore, UserContext};
pub use navigation::Route;
pub use playback::{HeadlessPlayer, MediaPlayer, PlaybackSession, SessionTimer, TimerStatus};
pub use records::{PracticeRecord, PracticeStats, RecordDraft, RecordService};
pub use reminder::{
    NotificationContent, NotificationScheduler, ReminderService, ReminderSetting, TimeOfDay,
    TokioScheduler,
};
pub use remote::{MemoryStore, PostgrestStore, RemoteStore};
