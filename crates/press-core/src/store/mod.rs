//! Content store abstraction.
//!
//! The [`ContentStore`] trait is the seam between the API layer and
//! whatever actually holds posts, terms, and metadata. Handlers only ever
//! talk to this trait; the SQLite backend lives in the `press-api` crate
//! and [`memory::InMemoryStore`] backs tests.
//!
//! Implementations must be `Send + Sync` to be shared across request
//! handlers.
//!
//! # Listing semantics
//!
//! Every backend applies the same rules, with the shared helpers in this
//! module keeping them aligned:
//!
//! - only published items of post type `post` are visible;
//! - search requires every whitespace-separated term to occur,
//!   case-insensitively, in the title, manual excerpt, or body;
//! - general listings are newest first (ties: higher ID first);
//! - `per_page > 0` slices, `per_page < 0` returns every match,
//!   `per_page == 0` falls back to the store's default page size.

pub mod memory;

use std::cmp::Ordering;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::models::{Category, ContentItem, ImportBundle, ImportSummary};
use crate::query::{parse_int, ListingFilter};

/// Abstract content backend.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`list_posts`](ContentStore::list_posts) | filtered, paginated listing |
/// | [`most_viewed`](ContentStore::most_viewed) | top items by a numeric meta value |
/// | [`list_categories`](ContentStore::list_categories) | every category with term meta |
/// | [`get_post`](ContentStore::get_post) | one published item |
/// | [`get_post_meta`](ContentStore::get_post_meta) | read a raw meta value |
/// | [`set_post_meta`](ContentStore::set_post_meta) | overwrite a raw meta value |
/// | [`increment_post_meta`](ContentStore::increment_post_meta) | atomic `+1` on a meta value |
/// | [`import`](ContentStore::import) | upsert a seed bundle |
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Items matching `filter`, newest first, sliced to the requested page.
    async fn list_posts(&self, filter: &ListingFilter) -> Result<Vec<ContentItem>>;

    /// Up to `limit` items carrying `meta_key`, ordered by its numeric value
    /// descending. Items without the key are excluded.
    async fn most_viewed(&self, meta_key: &str, limit: usize) -> Result<Vec<ContentItem>>;

    /// All categories ordered by name, then ID.
    async fn list_categories(&self) -> Result<Vec<Category>>;

    /// A published post by ID.
    async fn get_post(&self, id: i64) -> Result<Option<ContentItem>>;

    async fn get_post_meta(&self, id: i64, key: &str) -> Result<Option<String>>;

    async fn set_post_meta(&self, id: i64, key: &str, value: &str) -> Result<()>;

    /// Increments a numeric meta value in one step and returns the new
    /// value. Absent or non-numeric values count as 0.
    async fn increment_post_meta(&self, id: i64, key: &str) -> Result<i64>;

    /// Upserts every category, tag, and post in `bundle`. Fails without
    /// writing anything when a term ID would change taxonomy.
    async fn import(&self, bundle: &ImportBundle) -> Result<ImportSummary>;
}

/// Term IDs form one space shared by categories and tags. Rejects a
/// bundle that gives the same ID to both.
pub fn check_term_ids(bundle: &ImportBundle) -> Result<()> {
    for t in &bundle.tags {
        if bundle.categories.iter().any(|c| c.id == t.id) {
            bail!("term id {} is used by both a category and a tag", t.id);
        }
    }
    Ok(())
}

/// Resolves a caller-supplied page size: `Some(n)` for a bounded page,
/// `None` for "no limit".
pub fn effective_page_size(per_page: i64, default_per_page: i64) -> Option<i64> {
    match per_page.cmp(&0) {
        Ordering::Greater => Some(per_page),
        Ordering::Equal => Some(default_per_page),
        Ordering::Less => None,
    }
}

/// Lowercased search terms; empty when the filter has no search text.
pub fn search_terms(search: &str) -> Vec<String> {
    search.split_whitespace().map(|t| t.to_lowercase()).collect()
}

/// Whether every term occurs in the item's title, manual excerpt, or body.
pub fn matches_search(item: &ContentItem, terms: &[String]) -> bool {
    if terms.is_empty() {
        return true;
    }
    let title = item.title.to_lowercase();
    let body = item.body.to_lowercase();
    let excerpt = item.excerpt.as_deref().unwrap_or("").to_lowercase();
    terms
        .iter()
        .all(|t| title.contains(t) || body.contains(t) || excerpt.contains(t))
}

/// Newest first; equal timestamps fall back to the higher ID.
pub fn compare_newest_first(a: &ContentItem, b: &ContentItem) -> Ordering {
    b.published_at
        .cmp(&a.published_at)
        .then_with(|| b.id.cmp(&a.id))
}

/// Most-viewed ordering: numeric meta value descending, ties broken by
/// [`compare_newest_first`].
pub fn compare_most_viewed(a: &ContentItem, b: &ContentItem, meta_key: &str) -> Ordering {
    let va = a.meta.get(meta_key).map(|v| parse_int(v)).unwrap_or(0);
    let vb = b.meta.get(meta_key).map(|v| parse_int(v)).unwrap_or(0);
    vb.cmp(&va).then_with(|| compare_newest_first(a, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_rules() {
        assert_eq!(effective_page_size(5, 10), Some(5));
        assert_eq!(effective_page_size(0, 10), Some(10));
        assert_eq!(effective_page_size(-1, 10), None);
    }

    #[test]
    fn search_terms_lowercased() {
        assert_eq!(search_terms("  Lamb  Tajine "), vec!["lamb", "tajine"]);
        assert!(search_terms("").is_empty());
    }
}
