use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

use super::history::{HistoryEntry, PracticeStats};
use super::model::{PracticeRecord, RecordDraft};
use crate::alert::Alert;
use crate::local::{keys, KeyValueStore, UserContext};
use crate::remote::{PracticeLogRow, RemoteStore};

/// Saves practice records locally and mirrors them to the remote store
#[derive(Clone)]
pub struct RecordService {
    kv: Arc<dyn KeyValueStore>,
    remote: Arc<dyn RemoteStore>,
    user: UserContext,
    saving: Arc<AtomicBool>,
}

impl RecordService {
    pub fn new(kv: Arc<dyn KeyValueStore>, remote: Arc<dyn RemoteStore>, user: UserContext) -> Self {
        Self {
            kv,
            remote,
            user,
            saving: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Persist a draft as a new record at the head of the local list
    ///
    /// The remote mirror runs in the background and its failure is only
    /// logged. A save issued while another is in flight is rejected.
    pub async fn save(&self, draft: RecordDraft) -> Result<PracticeRecord, Alert> {
        if self.saving.swap(true, Ordering::SeqCst) {
            warn!("Save already in progress, ignoring");
            return Err(Alert::new("提示", "正在保存，请稍候"));
        }

        let result = self.save_inner(draft).await;
        self.saving.store(false, Ordering::SeqCst);

        result.map_err(|e| {
            error!("Failed to save practice record: {:#}", e);
            Alert::save_failed()
        })
    }

    async fn save_inner(&self, draft: RecordDraft) -> Result<PracticeRecord> {
        // An unreadable list is never overwritten
        let mut records = self.read_records().await?;

        let audio_id = draft.audio_id.as_deref().and_then(|id| id.parse::<i64>().ok());
        let record = draft.into_record(Utc::now());

        let log = PracticeLogRow {
            user_uuid: self.user.device_id().await,
            subject_id: self.user.subject_id().await,
            study_code: self.user.cohort_code().await,
            audio_id,
            duration: record.duration_seconds.unwrap_or(0),
            anxiety_rating: record.anxiety_rating,
            description: record.description.clone(),
            tags: record.tags.join(","),
            created_at: record.created_at.to_rfc3339(),
        };
        self.mirror(log);

        records.insert(0, record.clone());

        let json = serde_json::to_string(&records).context("Failed to encode practice records")?;
        self.kv
            .set(keys::PRACTICE_RECORDS, &json)
            .await
            .context("Failed to store practice records")?;

        info!(
            "Saved practice record {} ({:?} min, VAS {})",
            record.id, record.duration_minutes, record.anxiety_rating
        );

        Ok(record)
    }

    fn mirror(&self, log: PracticeLogRow) {
        let remote = Arc::clone(&self.remote);
        tokio::spawn(async move {
            match remote.insert_practice_log(&log).await {
                Ok(()) => info!(
                    "Practice log uploaded to {}: {}s, VAS {}",
                    remote.name(),
                    log.duration,
                    log.anxiety_rating
                ),
                Err(e) => error!("Practice log upload failed: {:#}", e),
            }
        });
    }

    async fn read_records(&self) -> Result<Vec<PracticeRecord>> {
        let json = self
            .kv
            .get(keys::PRACTICE_RECORDS)
            .await
            .context("Failed to read practice records")?;

        match json {
            Some(json) => {
                serde_json::from_str(&json).context("Stored practice records are unreadable")
            }
            None => Ok(Vec::new()),
        }
    }

    /// All records, newest first; unreadable storage yields an empty list
    pub async fn load_records(&self) -> Vec<PracticeRecord> {
        match self.read_records().await {
            Ok(records) => records,
            Err(e) => {
                warn!("{:#}, ignoring", e);
                Vec::new()
            }
        }
    }

    pub async fn history(&self) -> Vec<HistoryEntry> {
        let local = chrono::Local;
        self.load_records()
            .await
            .iter()
            .map(|record| HistoryEntry::from_record(record, &local))
            .collect()
    }

    pub async fn stats(&self) -> PracticeStats {
        PracticeStats::compute(&self.load_records().await, &chrono::Local::now())
    }
}
