use anyhow::Result;

use super::rows::{CategoryRow, PracticeLogRow, StudyAudioRow, StudyCodeRow};

/// Tabular query interface of the hosted backend
///
/// Implementations:
/// - `PostgrestStore`: PostgREST over HTTPS
/// - `MemoryStore`: in-process tables (tests, offline demos)
#[async_trait::async_trait]
pub trait RemoteStore: Send + Sync {
    /// All categories ordered by `sort_order` ascending
    async fn categories(&self) -> Result<Vec<CategoryRow>>;

    /// Audio rows mapped to a cohort, in query order, optionally limited
    async fn cohort_audios(&self, study_code: &str, limit: Option<usize>)
        -> Result<Vec<StudyAudioRow>>;

    /// Look up an active study code; `None` when missing or inactive
    async fn active_study_code(&self, code: &str) -> Result<Option<StudyCodeRow>>;

    /// Append one practice log
    async fn insert_practice_log(&self, row: &PracticeLogRow) -> Result<()>;

    /// Backend name for logging
    fn name(&self) -> &str;
}
