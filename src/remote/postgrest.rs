use anyhow::{Context, Result};
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::{debug, info};

use super::rows::{CategoryRow, PracticeLogRow, StudyAudioRow, StudyCodeRow};
use super::store::RemoteStore;
use crate::config::BackendConfig;

const AUDIO_COLUMNS: &str =
    "audio_id,audios(id,title,description,url,duration,category,cover_url,difficulty)";

/// Remote store speaking PostgREST (`/rest/v1/<table>`)
pub struct PostgrestStore {
    client: Client,
    base: Url,
    anon_key: String,
}

impl PostgrestStore {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        let base = Url::parse(&format!("{}/", config.url.trim_end_matches('/')))
            .with_context(|| format!("Invalid backend URL: {}", config.url))?;

        info!("Remote store configured at {}", base);

        Ok(Self {
            client,
            base,
            anon_key: config.anon_key.clone(),
        })
    }

    /// Build `<base>/rest/v1/<table>?<query>`
    pub fn table_url(&self, table: &str, query: &[(&str, String)]) -> Result<Url> {
        let mut url = self
            .base
            .join(&format!("rest/v1/{}", table))
            .with_context(|| format!("Invalid table path: {}", table))?;

        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    async fn select<T: serde::de::DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let url = self.table_url(table, query)?;
        debug!("GET {}", url);

        let rows = self
            .client
            .get(url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .send()
            .await
            .with_context(|| format!("Failed to query {}", table))?
            .error_for_status()
            .with_context(|| format!("Query on {} rejected", table))?
            .json::<Vec<T>>()
            .await
            .with_context(|| format!("Failed to decode {} rows", table))?;

        Ok(rows)
    }
}

#[async_trait::async_trait]
impl RemoteStore for PostgrestStore {
    async fn categories(&self) -> Result<Vec<CategoryRow>> {
        self.select(
            "categories",
            &[
                ("select", "key,title,sort_order".to_string()),
                ("order", "sort_order.asc".to_string()),
            ],
        )
        .await
    }

    async fn cohort_audios(
        &self,
        study_code: &str,
        limit: Option<usize>,
    ) -> Result<Vec<StudyAudioRow>> {
        let mut query = vec![
            ("select", AUDIO_COLUMNS.to_string()),
            ("study_code", format!("eq.{}", study_code)),
        ];
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }

        self.select("study_audio_map", &query).await
    }

    async fn active_study_code(&self, code: &str) -> Result<Option<StudyCodeRow>> {
        let rows: Vec<StudyCodeRow> = self
            .select(
                "study_codes",
                &[
                    ("select", "code,description".to_string()),
                    ("code", format!("eq.{}", code)),
                    ("is_active", "eq.true".to_string()),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;

        Ok(rows.into_iter().next())
    }

    async fn insert_practice_log(&self, row: &PracticeLogRow) -> Result<()> {
        let url = self.table_url("practice_logs", &[])?;

        self.client
            .post(url)
            .header("apikey", &self.anon_key)
            .header("Prefer", "return=minimal")
            .bearer_auth(&self.anon_key)
            .json(row)
            .send()
            .await
            .context("Failed to insert practice log")?
            .error_for_status()
            .context("Practice log insert rejected")?;

        Ok(())
    }

    fn name(&self) -> &str {
        "postgrest"
    }
}
