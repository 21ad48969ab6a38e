//! Daily practice reminder
//!
//! The reminder setting is persisted locally and drives exactly one repeating
//! notification schedule.

mod scheduler;
mod service;
mod settings;

pub use scheduler::{
    next_occurrence, NotificationContent, NotificationScheduler, ScheduledNotification,
    TokioScheduler,
};
pub use service::{ReminderService, ReminderUpdate};
pub use settings::{ReminderSetting, TimeOfDay, QUICK_TIMES};
