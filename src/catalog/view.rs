use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, error};

use super::models::{AudioItem, Category, ALL_CATEGORY_KEY};
use super::resolver::{filter_by_category, CatalogResolver};
use crate::alert::Alert;

/// Text shown when the selected filter leaves nothing to display
pub const EMPTY_LIST_TEXT: &str = "暂无相关音频";

#[derive(Debug, Default)]
struct ViewState {
    categories: Vec<Category>,
    items: Vec<AudioItem>,
    recommendation: Option<AudioItem>,
    selected_category: String,
}

/// Last-known catalog state for the list and home screens
///
/// A failed refresh leaves the previous data in place. Results that arrive
/// after `unmount` are dropped.
pub struct CatalogView {
    resolver: CatalogResolver,
    state: RwLock<ViewState>,
    loading: AtomicBool,
    mounted: AtomicBool,
}

impl CatalogView {
    pub fn new(resolver: CatalogResolver) -> Self {
        Self {
            resolver,
            state: RwLock::new(ViewState {
                categories: vec![Category::all()],
                selected_category: ALL_CATEGORY_KEY.to_string(),
                ..Default::default()
            }),
            loading: AtomicBool::new(false),
            mounted: AtomicBool::new(true),
        }
    }

    /// Reload categories and items for a cohort
    pub async fn refresh_list(&self, cohort_code: &str) -> Option<Alert> {
        self.loading.store(true, Ordering::SeqCst);

        let result = self.resolver.load(cohort_code).await;

        let alert = match result {
            Ok(snapshot) => {
                if self.is_mounted() {
                    let mut state = self.state.write().await;
                    state.categories = snapshot.categories;
                    state.items = snapshot.items;
                } else {
                    debug!("Catalog view unmounted, dropping list for {}", cohort_code);
                }
                None
            }
            Err(e) => {
                error!("Catalog load failed: {:#}", e);
                Some(Alert::load_failed())
            }
        };

        self.loading.store(false, Ordering::SeqCst);
        alert
    }

    /// Reload today's recommendation for a cohort
    pub async fn refresh_recommendation(&self, cohort_code: &str) -> Option<Alert> {
        self.loading.store(true, Ordering::SeqCst);

        let result = self.resolver.recommend(cohort_code).await;

        let alert = match result {
            Ok(recommendation) => {
                if self.is_mounted() {
                    self.state.write().await.recommendation = recommendation;
                } else {
                    debug!("Catalog view unmounted, dropping recommendation");
                }
                None
            }
            Err(e) => {
                error!("Recommendation load failed: {:#}", e);
                Some(Alert::load_failed())
            }
        };

        self.loading.store(false, Ordering::SeqCst);
        alert
    }

    pub async fn select_category(&self, key: &str) {
        self.state.write().await.selected_category = key.to_string();
    }

    pub async fn selected_category(&self) -> String {
        self.state.read().await.selected_category.clone()
    }

    pub async fn categories(&self) -> Vec<Category> {
        self.state.read().await.categories.clone()
    }

    /// All loaded items, unfiltered
    pub async fn items(&self) -> Vec<AudioItem> {
        self.state.read().await.items.clone()
    }

    /// Items under the selected category
    pub async fn visible_items(&self) -> Vec<AudioItem> {
        let state = self.state.read().await;
        filter_by_category(&state.items, &state.selected_category)
            .into_iter()
            .cloned()
            .collect()
    }

    /// True when loading has finished and the filter leaves no items
    pub async fn is_empty_state(&self) -> bool {
        !self.is_loading() && self.visible_items().await.is_empty()
    }

    pub async fn recommendation(&self) -> Option<AudioItem> {
        self.state.read().await.recommendation.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    /// Stop accepting results from in-flight refreshes
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
    }
}
