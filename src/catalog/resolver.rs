use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use super::models::{AudioItem, Category, ALL_CATEGORY_KEY, UNCATEGORIZED_KEY};
use crate::remote::{AudioRow, CategoryRow, RemoteStore};

const DEFAULT_DIFFICULTY: &str = "入门";
const DEFAULT_COVER_URL: &str = "https://via.placeholder.com/300";

/// Fallback values applied while resolving raw audio rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveDefaults {
    /// Label for category keys missing from the category table
    pub category_label: &'static str,
    pub description: &'static str,
}

impl ResolveDefaults {
    /// Defaults used by the browsable list
    pub const LIST: Self = Self {
        category_label: "通用",
        description: "暂无简介",
    };

    /// Defaults used by the daily recommendation card
    pub const RECOMMENDATION: Self = Self {
        category_label: "推荐",
        description: "每日精选正念练习",
    };
}

/// Full catalog for one cohort
#[derive(Debug, Clone, Default, Serialize)]
pub struct CatalogSnapshot {
    /// Sort-ordered categories with the synthetic "all" entry first
    pub categories: Vec<Category>,
    /// Items in query order
    pub items: Vec<AudioItem>,
}

/// key → display label
pub type CategoryLabels = HashMap<String, String>;

/// Joins a cohort's audio mapping with the category table
#[derive(Clone)]
pub struct CatalogResolver {
    store: Arc<dyn RemoteStore>,
}

impl CatalogResolver {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    /// Everything visible to `cohort_code`
    ///
    /// Both lookups run concurrently and must both succeed.
    pub async fn load(&self, cohort_code: &str) -> Result<CatalogSnapshot> {
        info!("Loading catalog for cohort {}", cohort_code);

        let (category_rows, audio_rows) = futures::try_join!(
            async {
                self.store
                    .categories()
                    .await
                    .context("Failed to load categories")
            },
            async {
                self.store
                    .cohort_audios(cohort_code, None)
                    .await
                    .context("Failed to load cohort audios")
            },
        )?;

        let labels = category_labels(&category_rows);

        let mut categories = Vec::with_capacity(category_rows.len() + 1);
        categories.push(Category::all());
        categories.extend(category_rows.into_iter().map(|row| Category {
            id: row.key.clone(),
            title: row.title,
            key: row.key,
            sort_order: row.sort_order,
        }));

        let items: Vec<AudioItem> = audio_rows
            .into_iter()
            .filter_map(|row| row.audios)
            .map(|audio| resolve_audio(audio, &labels, &ResolveDefaults::LIST))
            .collect();

        info!(
            "Catalog for {}: {} categories, {} items",
            cohort_code,
            categories.len(),
            items.len()
        );

        Ok(CatalogSnapshot { categories, items })
    }

    /// First item mapped to `cohort_code`, if any
    pub async fn recommend(&self, cohort_code: &str) -> Result<Option<AudioItem>> {
        let (audio_rows, category_rows) = futures::try_join!(
            async {
                self.store
                    .cohort_audios(cohort_code, Some(1))
                    .await
                    .context("Failed to load recommendation")
            },
            async {
                self.store
                    .categories()
                    .await
                    .context("Failed to load categories")
            },
        )?;

        let labels = category_labels(&category_rows);

        Ok(audio_rows
            .into_iter()
            .next()
            .and_then(|row| row.audios)
            .map(|audio| resolve_audio(audio, &labels, &ResolveDefaults::RECOMMENDATION)))
    }
}

/// Build the key → label table
pub fn category_labels(rows: &[CategoryRow]) -> CategoryLabels {
    rows.iter()
        .map(|row| (row.key.clone(), row.title.clone()))
        .collect()
}

/// Turn a raw audio row into a display-ready item
///
/// Every optional column is replaced by a default; nothing is left empty
/// except the media URL, which playback validates.
pub fn resolve_audio(
    audio: AudioRow,
    labels: &CategoryLabels,
    defaults: &ResolveDefaults,
) -> AudioItem {
    let category_key = audio
        .category
        .filter(|key| !key.is_empty())
        .unwrap_or_else(|| UNCATEGORIZED_KEY.to_string());

    let category_label = labels
        .get(&category_key)
        .filter(|label| !label.is_empty())
        .cloned()
        .unwrap_or_else(|| defaults.category_label.to_string());

    AudioItem {
        id: audio.id.to_string(),
        title: audio.title,
        description: non_empty_or(audio.description, defaults.description),
        duration_secs: audio.duration.unwrap_or(0),
        category_key,
        category_label,
        difficulty: non_empty_or(audio.difficulty, DEFAULT_DIFFICULTY),
        cover_url: non_empty_or(audio.cover_url, DEFAULT_COVER_URL),
        media_url: audio.url.unwrap_or_default(),
    }
}

/// Client-side category filter; the "all" key keeps everything
pub fn filter_by_category<'a>(items: &'a [AudioItem], key: &str) -> Vec<&'a AudioItem> {
    if key == ALL_CATEGORY_KEY {
        return items.iter().collect();
    }
    items.iter().filter(|item| item.category_key == key).collect()
}

fn non_empty_or(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}
