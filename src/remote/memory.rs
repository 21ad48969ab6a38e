use anyhow::{bail, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

use super::rows::{AudioRow, CategoryRow, PracticeLogRow, StudyAudioRow, StudyCodeRow};
use super::store::RemoteStore;

#[derive(Debug, Default)]
struct Tables {
    categories: Vec<CategoryRow>,
    audios: Vec<AudioRow>,
    /// study_code → audio_id, in insertion order
    study_audio_map: Vec<(String, i64)>,
    /// (code row, is_active)
    study_codes: Vec<(StudyCodeRow, bool)>,
    practice_logs: Vec<PracticeLogRow>,
}

/// In-process remote store with the same query semantics as the hosted backend
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    /// When set, every query fails as if the network were down
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_category(&self, key: &str, title: &str, sort_order: i32) {
        self.tables.write().await.categories.push(CategoryRow {
            key: key.to_string(),
            title: title.to_string(),
            sort_order: Some(sort_order),
        });
    }

    pub async fn add_audio(&self, audio: AudioRow) {
        self.tables.write().await.audios.push(audio);
    }

    pub async fn map_audio(&self, study_code: &str, audio_id: i64) {
        self.tables
            .write()
            .await
            .study_audio_map
            .push((study_code.to_string(), audio_id));
    }

    pub async fn add_study_code(&self, code: &str, description: &str, is_active: bool) {
        self.tables.write().await.study_codes.push((
            StudyCodeRow {
                code: code.to_string(),
                description: Some(description.to_string()),
            },
            is_active,
        ));
    }

    pub async fn practice_logs(&self) -> Vec<PracticeLogRow> {
        self.tables.read().await.practice_logs.clone()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            bail!("remote store unreachable");
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl RemoteStore for MemoryStore {
    async fn categories(&self) -> Result<Vec<CategoryRow>> {
        self.check_online()?;

        let mut categories = self.tables.read().await.categories.clone();
        // Rows without a sort order go last, like `nullslast` on the hosted query
        categories.sort_by_key(|c| (c.sort_order.is_none(), c.sort_order));
        Ok(categories)
    }

    async fn cohort_audios(
        &self,
        study_code: &str,
        limit: Option<usize>,
    ) -> Result<Vec<StudyAudioRow>> {
        self.check_online()?;

        let tables = self.tables.read().await;
        let rows: Vec<StudyAudioRow> = tables
            .study_audio_map
            .iter()
            .filter(|(code, _)| code == study_code)
            .map(|(_, audio_id)| StudyAudioRow {
                audio_id: Some(*audio_id),
                audios: tables.audios.iter().find(|a| a.id == *audio_id).cloned(),
            })
            .take(limit.unwrap_or(usize::MAX))
            .collect();

        debug!("Memory store: {} rows for cohort {}", rows.len(), study_code);
        Ok(rows)
    }

    async fn active_study_code(&self, code: &str) -> Result<Option<StudyCodeRow>> {
        self.check_online()?;

        Ok(self
            .tables
            .read()
            .await
            .study_codes
            .iter()
            .find(|(row, active)| *active && row.code == code)
            .map(|(row, _)| row.clone()))
    }

    async fn insert_practice_log(&self, row: &PracticeLogRow) -> Result<()> {
        self.check_online()?;

        self.tables.write().await.practice_logs.push(row.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
