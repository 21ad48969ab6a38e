// Integration tests for practice records
//
// These tests verify local persistence of records, the background upload
// to the remote store, and the derived history statistics.

use anyhow::Result;
use chrono::{TimeZone, Utc};
use practice_companion::alert::Alert;
use practice_companion::local::{keys, FileKvStore, KeyValueStore, MemoryKvStore, UserContext};
use practice_companion::records::{PracticeRecord, PracticeStats, RecordDraft, RecordService};
use practice_companion::remote::{MemoryStore, RemoteStore};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn service(kv: Arc<dyn KeyValueStore>, remote: Arc<dyn RemoteStore>) -> RecordService {
    let user = UserContext::new(Arc::clone(&kv), "PUBLIC");
    RecordService::new(kv, remote, user)
}

fn record(id: &str, created_at: chrono::DateTime<Utc>, minutes: Option<u64>) -> PracticeRecord {
    PracticeRecord {
        id: id.to_string(),
        created_at,
        display_time: String::new(),
        duration_minutes: minutes,
        duration_seconds: minutes.map(|m| m * 60),
        anxiety_rating: 40,
        description: String::new(),
        tags: Vec::new(),
    }
}

#[tokio::test]
async fn test_saved_records_survive_restart() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let remote: Arc<dyn RemoteStore> = Arc::new(MemoryStore::new());

    let first = {
        let kv: Arc<dyn KeyValueStore> = Arc::new(FileKvStore::in_dir(temp_dir.path()));
        let records = service(kv, Arc::clone(&remote));

        let mut draft = RecordDraft::for_practice(Some("42".to_string()), Some(754));
        draft.set_anxiety_rating(30);
        draft.toggle_tag("放松");
        let first = records.save(draft).await?;

        records.save(RecordDraft::new()).await?;
        first
    };

    // Reopen the store from disk
    let kv: Arc<dyn KeyValueStore> = Arc::new(FileKvStore::in_dir(temp_dir.path()));
    let records = service(kv, remote).load_records().await;

    assert_eq!(records.len(), 2);
    // Newest first
    assert_eq!(records[1], first);
    assert_eq!(records[1].duration_minutes, Some(12));
    assert_eq!(records[1].duration_seconds, Some(754));
    assert_eq!(records[1].description, "#放松");
    assert_eq!(records[0].duration_minutes, None);

    Ok(())
}

#[tokio::test]
async fn test_record_is_mirrored_to_remote() -> Result<()> {
    let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
    let remote = Arc::new(MemoryStore::new());
    let user = UserContext::new(Arc::clone(&kv), "PUBLIC");
    user.set_subject_id("123456").await?;
    let records = RecordService::new(kv, remote.clone(), user.clone());

    let mut draft = RecordDraft::for_practice(Some("42".to_string()), Some(600));
    draft.set_anxiety_rating(70);
    draft.toggle_tag("焦虑");
    draft.toggle_tag("专注");
    records.save(draft).await?;

    // The upload runs in the background
    let mut logs = Vec::new();
    for _ in 0..50 {
        logs = remote.practice_logs().await;
        if !logs.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(logs.len(), 1);
    let log = &logs[0];
    assert_eq!(log.audio_id, Some(42));
    assert_eq!(log.duration, 600);
    assert_eq!(log.anxiety_rating, 70);
    assert_eq!(log.tags, "焦虑,专注");
    assert_eq!(log.study_code, "PUBLIC");
    assert_eq!(log.subject_id.as_deref(), Some("123456"));
    assert_eq!(log.user_uuid, user.device_id().await);

    Ok(())
}

#[tokio::test]
async fn test_remote_failure_does_not_block_local_save() -> Result<()> {
    let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
    let remote = Arc::new(MemoryStore::new());
    remote.set_offline(true);
    let records = service(kv, remote.clone());

    records
        .save(RecordDraft::for_practice(None, Some(400)))
        .await?;

    assert_eq!(records.load_records().await.len(), 1);
    assert!(remote.practice_logs().await.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_unreadable_records_yield_empty_history() -> Result<()> {
    let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
    kv.set(keys::PRACTICE_RECORDS, "not json").await?;
    let records = service(kv, Arc::new(MemoryStore::new()));

    assert!(records.history().await.is_empty());
    assert_eq!(records.stats().await.total_practice_count, 0);

    Ok(())
}

#[test]
fn test_stats_count_only_valid_practice() {
    // Wednesday 2025-03-12
    let now = Utc.with_ymd_and_hms(2025, 3, 12, 18, 0, 0).unwrap();
    let records = vec![
        record("a", Utc.with_ymd_and_hms(2025, 3, 10, 8, 0, 0).unwrap(), Some(10)),
        record("b", Utc.with_ymd_and_hms(2025, 3, 12, 8, 0, 0).unwrap(), Some(5)),
        record("c", Utc.with_ymd_and_hms(2025, 3, 12, 9, 0, 0).unwrap(), Some(20)),
        record("d", Utc.with_ymd_and_hms(2025, 3, 11, 9, 0, 0).unwrap(), None),
        // Previous week's Sunday
        record("e", Utc.with_ymd_and_hms(2025, 3, 9, 9, 0, 0).unwrap(), Some(15)),
    ];

    let stats = PracticeStats::compute(&records, &now);

    assert_eq!(stats.total_practice_count, 3);
    assert_eq!(stats.total_practice_minutes, 50);
    assert_eq!(stats.week_progress.completed_days, 2);
    assert_eq!(
        stats.week_progress.daily_progress,
        [true, false, true, false, false, false, false]
    );
}

#[test]
fn test_stats_week_starts_on_monday() {
    // Sunday 2025-03-16 belongs to the week starting Monday 2025-03-10
    let now = Utc.with_ymd_and_hms(2025, 3, 16, 21, 0, 0).unwrap();
    let records = vec![
        record("a", Utc.with_ymd_and_hms(2025, 3, 16, 20, 0, 0).unwrap(), Some(6)),
        record("b", Utc.with_ymd_and_hms(2025, 3, 10, 7, 0, 0).unwrap(), Some(6)),
    ];

    let stats = PracticeStats::compute(&records, &now);

    assert_eq!(stats.week_progress.completed_days, 2);
    assert!(stats.week_progress.daily_progress[0]);
    assert!(stats.week_progress.daily_progress[6]);
}

#[tokio::test]
async fn test_save_keeps_unreadable_list_intact() -> Result<()> {
    let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
    let remote = Arc::new(MemoryStore::new());
    // A rating outside 0-255 cannot be decoded
    let stored = r#"[{"id":"1","createdAt":"2025-03-10T08:00:00Z","duration":10,"anxietyRating":300}]"#;
    kv.set(keys::PRACTICE_RECORDS, stored).await?;
    let records = service(Arc::clone(&kv), remote.clone());

    let result = records.save(RecordDraft::new()).await;

    assert_eq!(result, Err(Alert::save_failed()));
    assert_eq!(kv.get(keys::PRACTICE_RECORDS).await?.as_deref(), Some(stored));
    assert!(remote.practice_logs().await.is_empty());

    // A later save is not blocked by the failed one
    kv.set(keys::PRACTICE_RECORDS, "[]").await?;
    records.save(RecordDraft::new()).await?;
    assert_eq!(records.load_records().await.len(), 1);

    Ok(())
}
