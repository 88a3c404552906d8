//! In-memory [`ContentStore`] implementation for tests and fixtures.
//!
//! Uses `BTreeMap`s behind `std::sync::RwLock`. Posts keep their term
//! references as IDs and are resolved against the current category and
//! tag tables on every read, the same way the SQLite backend joins.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::models::{
    sort_terms, Category, ContentItem, ImportBundle, ImportSummary, PostRecord, Tag, TermRef,
};
use crate::projection::ICON_META_KEY;
use crate::query::{parse_int, ListingFilter, DEFAULT_PER_PAGE};

use super::{
    check_term_ids, compare_most_viewed, compare_newest_first, effective_page_size, matches_search, search_terms,
    ContentStore,
};

/// In-memory store.
pub struct InMemoryStore {
    posts: RwLock<BTreeMap<i64, PostRecord>>,
    categories: RwLock<BTreeMap<i64, Category>>,
    tags: RwLock<BTreeMap<i64, Tag>>,
    default_per_page: i64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::with_default_per_page(DEFAULT_PER_PAGE)
    }

    pub fn with_default_per_page(default_per_page: i64) -> Self {
        Self {
            posts: RwLock::new(BTreeMap::new()),
            categories: RwLock::new(BTreeMap::new()),
            tags: RwLock::new(BTreeMap::new()),
            default_per_page,
        }
    }

    fn resolve(&self, rec: &PostRecord) -> Result<ContentItem> {
        let categories = read(&self.categories)?;
        let tags = read(&self.tags)?;

        let mut cat_refs: Vec<TermRef> = rec
            .categories
            .iter()
            .filter_map(|id| categories.get(id))
            .map(|c| TermRef {
                id: c.id,
                name: c.name.clone(),
                slug: c.slug.clone(),
            })
            .collect();
        sort_terms(&mut cat_refs);

        let mut tag_refs: Vec<TermRef> = rec
            .tags
            .iter()
            .filter_map(|id| tags.get(id))
            .map(|t| TermRef {
                id: t.id,
                name: t.name.clone(),
                slug: t.slug.clone(),
            })
            .collect();
        sort_terms(&mut tag_refs);

        Ok(ContentItem {
            id: rec.id,
            post_type: rec.post_type.clone(),
            status: rec.status,
            title: rec.title.clone(),
            body: rec.body.clone(),
            excerpt: rec.excerpt.clone(),
            published_at: rec.published_at,
            comment_count: rec.comment_count,
            thumbnail_url: rec.thumbnail_url.clone(),
            categories: cat_refs,
            tags: tag_refs,
            meta: rec.meta.clone(),
        })
    }

    fn listable_items(&self) -> Result<Vec<ContentItem>> {
        let records: Vec<PostRecord> = read(&self.posts)?.values().cloned().collect();
        let mut items = Vec::with_capacity(records.len());
        for rec in &records {
            let item = self.resolve(rec)?;
            if item.is_listable() {
                items.push(item);
            }
        }
        Ok(items)
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>> {
    lock.read().map_err(|_| anyhow!("in-memory store lock poisoned"))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>> {
    lock.write().map_err(|_| anyhow!("in-memory store lock poisoned"))
}

#[async_trait]
impl ContentStore for InMemoryStore {
    async fn list_posts(&self, filter: &ListingFilter) -> Result<Vec<ContentItem>> {
        let terms = search_terms(&filter.search);
        let mut items: Vec<ContentItem> = self
            .listable_items()?
            .into_iter()
            .filter(|it| matches_search(it, &terms))
            .filter(|it| match filter.category {
                Some(id) => it.categories.iter().any(|c| c.id == id),
                None => true,
            })
            .filter(|it| match filter.tag {
                Some(id) => it.tags.iter().any(|t| t.id == id),
                None => true,
            })
            .collect();
        items.sort_by(compare_newest_first);

        match effective_page_size(filter.per_page, self.default_per_page) {
            Some(size) => {
                let offset = usize::try_from(filter.offset(size)).unwrap_or(usize::MAX);
                let size = usize::try_from(size).unwrap_or(usize::MAX);
                Ok(items.into_iter().skip(offset).take(size).collect())
            }
            None => Ok(items),
        }
    }

    async fn most_viewed(&self, meta_key: &str, limit: usize) -> Result<Vec<ContentItem>> {
        let mut items: Vec<ContentItem> = self
            .listable_items()?
            .into_iter()
            .filter(|it| it.meta.contains_key(meta_key))
            .collect();
        items.sort_by(|a, b| compare_most_viewed(a, b, meta_key));
        items.truncate(limit);
        Ok(items)
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let mut cats: Vec<Category> = read(&self.categories)?.values().cloned().collect();
        cats.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then(a.id.cmp(&b.id))
        });
        Ok(cats)
    }

    async fn get_post(&self, id: i64) -> Result<Option<ContentItem>> {
        let rec = match read(&self.posts)?.get(&id) {
            Some(rec) => rec.clone(),
            None => return Ok(None),
        };
        let item = self.resolve(&rec)?;
        Ok(item.is_listable().then_some(item))
    }

    async fn get_post_meta(&self, id: i64, key: &str) -> Result<Option<String>> {
        Ok(read(&self.posts)?
            .get(&id)
            .and_then(|rec| rec.meta.get(key).cloned()))
    }

    async fn set_post_meta(&self, id: i64, key: &str, value: &str) -> Result<()> {
        let mut posts = write(&self.posts)?;
        let rec = posts
            .get_mut(&id)
            .ok_or_else(|| anyhow!("post not found: {}", id))?;
        rec.meta.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn increment_post_meta(&self, id: i64, key: &str) -> Result<i64> {
        let mut posts = write(&self.posts)?;
        let rec = posts
            .get_mut(&id)
            .ok_or_else(|| anyhow!("post not found: {}", id))?;
        let next = rec
            .meta
            .get(key)
            .map(|v| parse_int(v))
            .unwrap_or(0)
            .max(0)
            .saturating_add(1);
        rec.meta.insert(key.to_string(), next.to_string());
        Ok(next)
    }

    async fn import(&self, bundle: &ImportBundle) -> Result<ImportSummary> {
        check_term_ids(bundle)?;
        {
            let categories = read(&self.categories)?;
            let tags = read(&self.tags)?;
            if let Some(c) = bundle.categories.iter().find(|c| tags.contains_key(&c.id)) {
                return Err(anyhow!("term id {} is already a tag", c.id));
            }
            if let Some(t) = bundle.tags.iter().find(|t| categories.contains_key(&t.id)) {
                return Err(anyhow!("term id {} is already a category", t.id));
            }
        }
        {
            let mut categories = write(&self.categories)?;
            for c in &bundle.categories {
                let mut meta = categories
                    .get(&c.id)
                    .map(|existing| existing.meta.clone())
                    .unwrap_or_default();
                match &c.icon_url {
                    Some(icon) => {
                        meta.insert(ICON_META_KEY.to_string(), icon.clone());
                    }
                    None => {
                        meta.remove(ICON_META_KEY);
                    }
                }
                categories.insert(
                    c.id,
                    Category {
                        id: c.id,
                        name: c.name.clone(),
                        slug: c.slug.clone(),
                        meta,
                    },
                );
            }
        }
        {
            let mut tags = write(&self.tags)?;
            for t in &bundle.tags {
                tags.insert(t.id, t.clone());
            }
        }
        {
            let mut posts = write(&self.posts)?;
            for p in &bundle.posts {
                // Imported meta is merged so re-importing keeps live counters.
                let mut rec = p.clone();
                if let Some(existing) = posts.get(&p.id) {
                    let mut meta = existing.meta.clone();
                    meta.extend(p.meta.clone());
                    rec.meta = meta;
                }
                posts.insert(p.id, rec);
            }
        }

        Ok(ImportSummary {
            categories: bundle.categories.len(),
            tags: bundle.tags.len(),
            posts: bundle.posts.len(),
        })
    }
}
