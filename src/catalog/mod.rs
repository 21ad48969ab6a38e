//! Audio catalog
//!
//! Resolves the audio items a cohort may see, with category keys translated
//! to display labels, for both the browsable list and the daily
//! recommendation.

mod models;
mod resolver;
mod view;

pub use models::{format_clock, AudioItem, Category, ALL_CATEGORY_KEY, UNCATEGORIZED_KEY};
pub use resolver::{
    category_labels, filter_by_category, resolve_audio, CatalogResolver, CatalogSnapshot,
    CategoryLabels, ResolveDefaults,
};
pub use view::{CatalogView, EMPTY_LIST_TEXT};
