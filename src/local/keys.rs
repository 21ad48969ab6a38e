// Keys used in the local key-value store

pub const COHORT_CODE: &str = "user_study_code";
pub const DEVICE_ID: &str = "device_anonymous_id";
pub const SUBJECT_ID: &str = "research_subject_id";
pub const PRACTICE_RECORDS: &str = "user_practice_records";
pub const REMINDER_SETTINGS: &str = "user_reminder_settings";
