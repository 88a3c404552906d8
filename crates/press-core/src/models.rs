//! Core content types served by press-api.
//!
//! These mirror what the content store holds: posts with their taxonomy
//! terms and metadata. The API layer never mutates them, except for the
//! view counter stored in post metadata.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The only post type the listing endpoints return.
pub const POST_TYPE_POST: &str = "post";

/// Publication status of a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Publish,
    Draft,
    Private,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Publish => "publish",
            PostStatus::Draft => "draft",
            PostStatus::Private => "private",
        }
    }

    /// Parses a stored status string. Unknown values are treated as drafts
    /// so they never leak into public listings.
    pub fn parse(s: &str) -> Self {
        match s {
            "publish" => PostStatus::Publish,
            "private" => PostStatus::Private,
            _ => PostStatus::Draft,
        }
    }
}

/// A reference from a post to one of its taxonomy terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermRef {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

/// A category (hierarchical taxonomy term) with its term-level metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
}

/// A flat tag label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

/// A single post as read from the content store.
///
/// `categories` and `tags` are always present; an unclassified post
/// carries empty vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: i64,
    #[serde(default = "default_post_type")]
    pub post_type: String,
    #[serde(default)]
    pub status: PostStatus,
    pub title: String,
    /// Raw body, possibly containing markup and shortcodes.
    pub body: String,
    /// Hand-written excerpt. When absent the body is used instead.
    #[serde(default)]
    pub excerpt: Option<String>,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub comment_count: i64,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub categories: Vec<TermRef>,
    #[serde(default)]
    pub tags: Vec<TermRef>,
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
}

fn default_post_type() -> String {
    POST_TYPE_POST.to_string()
}

impl ContentItem {
    /// Whether the item is a published post, i.e. visible to the API.
    pub fn is_listable(&self) -> bool {
        self.post_type == POST_TYPE_POST && self.status == PostStatus::Publish
    }
}

/// Seed/import payload: the shape of the JSON files accepted by
/// `press import`.
///
/// Posts reference their terms by ID; names and slugs are resolved from
/// the bundle (or the existing store) at import time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportBundle {
    #[serde(default)]
    pub categories: Vec<CategoryRecord>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub posts: Vec<PostRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub id: i64,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: i64,
    #[serde(default = "default_post_type")]
    pub post_type: String,
    #[serde(default)]
    pub status: PostStatus,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub comment_count: i64,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub categories: Vec<i64>,
    #[serde(default)]
    pub tags: Vec<i64>,
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
}

/// Counts reported after an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub categories: usize,
    pub tags: usize,
    pub posts: usize,
}

/// Orders term references the way the store reports them: by name
/// (case-insensitive), then ID.
pub fn sort_terms(terms: &mut [TermRef]) {
    terms.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then(a.id.cmp(&b.id))
    });
}
