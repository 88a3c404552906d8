//! Projection mapper: [`ContentItem`] → client-facing JSON shapes.
//!
//! The general listing and the most-viewed listing return different
//! shapes, so each gets its own type ([`FullPost`], [`CompactPost`])
//! rather than one struct with optional fields. Every identifier is
//! emitted as a string so mobile clients never lose precision on large
//! numeric IDs.
//!
//! Projections are pure and infallible. Missing optional data becomes
//! `""` or `0`, never `null`.

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use crate::models::{Category, ContentItem, TermRef};
use crate::query::parse_int;
use crate::text::{strip_all_tags, strip_shortcodes, trim_words};
use crate::views::DEFAULT_VIEWS_META_KEY;

/// Term-level metadata key holding a category's icon URL.
pub const ICON_META_KEY: &str = "icon_url";

/// Suffix appended to truncated excerpts.
pub const EXCERPT_MORE: &str = "...";

/// Knobs for projections that depend on site configuration.
#[derive(Debug, Clone)]
pub struct ProjectionOptions {
    /// Words kept in the `excerpt` field.
    pub excerpt_words: usize,
    /// `chrono` strftime pattern for the `date` field.
    pub date_format: String,
    /// Post metadata key the view counter is stored under.
    pub views_meta_key: String,
}

impl Default for ProjectionOptions {
    fn default() -> Self {
        Self {
            excerpt_words: 30,
            date_format: "%B %-d, %Y".to_string(),
            views_meta_key: DEFAULT_VIEWS_META_KEY.to_string(),
        }
    }
}

/// `{id, name, slug}` for a category or tag attached to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermResponse {
    pub id: String,
    pub name: String,
    pub slug: String,
}

/// Post shape returned by `GET /posts/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullPost {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub image: String,
    pub date: String,
    pub comment_count: i64,
    pub views: i64,
    pub categories: Vec<TermResponse>,
    pub tags: Vec<TermResponse>,
}

/// Post shape returned by `GET /most-viewed/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactPost {
    pub id: String,
    pub title: String,
    pub content: String,
    pub image: String,
    pub date: String,
    pub comment_count: i64,
}

/// Category shape returned by `GET /categories/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub icon_url: String,
}

pub fn project_full(item: &ContentItem, opts: &ProjectionOptions) -> FullPost {
    let filtered = filter_content(&item.body);
    let excerpt_source = item.excerpt.as_deref().unwrap_or(&filtered);

    FullPost {
        id: item.id.to_string(),
        title: item.title.clone(),
        excerpt: trim_words(excerpt_source, opts.excerpt_words, EXCERPT_MORE),
        content: strip_all_tags(&filtered),
        image: item.thumbnail_url.clone().unwrap_or_default(),
        date: format_date(item, &opts.date_format),
        comment_count: item.comment_count.max(0),
        views: view_count(item, &opts.views_meta_key),
        categories: item.categories.iter().map(project_term).collect(),
        tags: item.tags.iter().map(project_term).collect(),
    }
}

/// The compact shape strips markup from the raw body without running the
/// content filters first, so unrendered shortcodes stay in the text.
pub fn project_compact(item: &ContentItem, opts: &ProjectionOptions) -> CompactPost {
    CompactPost {
        id: item.id.to_string(),
        title: item.title.clone(),
        content: strip_all_tags(&item.body),
        image: item.thumbnail_url.clone().unwrap_or_default(),
        date: format_date(item, &opts.date_format),
        comment_count: item.comment_count.max(0),
    }
}

pub fn project_category(category: &Category) -> CategoryResponse {
    CategoryResponse {
        id: category.id.to_string(),
        name: category.name.clone(),
        slug: category.slug.clone(),
        icon_url: category
            .meta
            .get(ICON_META_KEY)
            .cloned()
            .unwrap_or_default(),
    }
}

fn project_term(term: &TermRef) -> TermResponse {
    TermResponse {
        id: term.id.to_string(),
        name: term.name.clone(),
        slug: term.slug.clone(),
    }
}

/// Body filtering applied before the full projection strips markup.
pub fn filter_content(body: &str) -> String {
    strip_shortcodes(body)
}

/// Current view count for an item; absent or non-numeric metadata is 0.
pub fn view_count(item: &ContentItem, meta_key: &str) -> i64 {
    item.meta
        .get(meta_key)
        .map(|v| parse_int(v).max(0))
        .unwrap_or(0)
}

/// Rejects strftime patterns chrono cannot render.
pub fn check_date_format(pattern: &str) -> anyhow::Result<()> {
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        anyhow::bail!("unsupported date format: '{}'", pattern);
    }
    Ok(())
}

/// Falls back to RFC 3339 when `pattern` cannot be rendered.
fn format_date(item: &ContentItem, pattern: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", item.published_at.format(pattern)).is_err() {
        return item.published_at.to_rfc3339();
    }
    out
}
