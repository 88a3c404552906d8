//! Per-post view counter.
//!
//! A view is recorded once per render of a single post page; listings never
//! count. The counter lives in post metadata under a configurable key.
//!
//! Two update strategies exist, selected by [`CounterMode`]:
//!
//! - [`CounterMode::ReadModifyWrite`] reads the current value, adds one,
//!   and writes it back as two separate store calls. Concurrent renders of
//!   the same post can overwrite each other and lose increments. This is
//!   the default and matches how the counter has always behaved.
//! - [`CounterMode::Atomic`] delegates to
//!   [`ContentStore::increment_post_meta`], which applies `+1` in a single
//!   store operation.
//!
//! There is no per-viewer dedup: every render counts.

use anyhow::Result;
use serde::Deserialize;

use crate::query::parse_int;
use crate::store::ContentStore;

/// Post metadata key the counter is stored under unless configured otherwise.
pub const DEFAULT_VIEWS_META_KEY: &str = "post_views_count";

/// How [`ViewCounter::record_view`] updates the stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterMode {
    #[default]
    ReadModifyWrite,
    Atomic,
}

impl CounterMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CounterMode::ReadModifyWrite => "read_modify_write",
            CounterMode::Atomic => "atomic",
        }
    }
}

/// Records single-post renders against a [`ContentStore`].
#[derive(Debug, Clone)]
pub struct ViewCounter {
    mode: CounterMode,
    meta_key: String,
}

impl Default for ViewCounter {
    fn default() -> Self {
        Self::new(CounterMode::default(), DEFAULT_VIEWS_META_KEY)
    }
}

impl ViewCounter {
    pub fn new(mode: CounterMode, meta_key: impl Into<String>) -> Self {
        Self {
            mode,
            meta_key: meta_key.into(),
        }
    }

    pub fn mode(&self) -> CounterMode {
        self.mode
    }

    pub fn meta_key(&self) -> &str {
        &self.meta_key
    }

    /// Counts one render of post `id` and returns the new value.
    ///
    /// Returns `Ok(None)` without writing anything when `id` is not a
    /// published post.
    pub async fn record_view(&self, store: &dyn ContentStore, id: i64) -> Result<Option<i64>> {
        if id <= 0 || store.get_post(id).await?.is_none() {
            return Ok(None);
        }

        let next = match self.mode {
            CounterMode::Atomic => store.increment_post_meta(id, &self.meta_key).await?,
            CounterMode::ReadModifyWrite => {
                let current = store
                    .get_post_meta(id, &self.meta_key)
                    .await?
                    .map(|v| parse_int(&v).max(0))
                    .unwrap_or(0);
                let next = current.saturating_add(1);
                store
                    .set_post_meta(id, &self.meta_key, &next.to_string())
                    .await?;
                next
            }
        };
        Ok(Some(next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ImportBundle, PostRecord, PostStatus};
    use crate::store::memory::InMemoryStore;
    use chrono::Utc;

    async fn store_with_post(status: PostStatus) -> InMemoryStore {
        let store = InMemoryStore::new();
        store
            .import(&ImportBundle {
                posts: vec![PostRecord {
                    id: 11,
                    post_type: "post".into(),
                    status,
                    title: "Counted".into(),
                    body: String::new(),
                    excerpt: None,
                    published_at: Utc::now(),
                    comment_count: 0,
                    thumbnail_url: None,
                    categories: vec![],
                    tags: vec![],
                    meta: Default::default(),
                }],
                ..Default::default()
            })
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn five_sequential_renders_count_five() {
        let store = store_with_post(PostStatus::Publish).await;
        let counter = ViewCounter::default();
        for _ in 0..5 {
            counter.record_view(&store, 11).await.unwrap();
        }
        assert_eq!(
            store.get_post_meta(11, DEFAULT_VIEWS_META_KEY).await.unwrap(),
            Some("5".to_string())
        );
    }

    #[tokio::test]
    async fn atomic_mode_counts_the_same_sequentially() {
        let store = store_with_post(PostStatus::Publish).await;
        let counter = ViewCounter::new(CounterMode::Atomic, "hits");
        for _ in 0..5 {
            counter.record_view(&store, 11).await.unwrap();
        }
        assert_eq!(
            store.get_post_meta(11, "hits").await.unwrap(),
            Some("5".to_string())
        );
    }

    #[tokio::test]
    async fn non_numeric_counter_restarts_at_one() {
        let store = store_with_post(PostStatus::Publish).await;
        store
            .set_post_meta(11, DEFAULT_VIEWS_META_KEY, "n/a")
            .await
            .unwrap();
        let next = ViewCounter::default().record_view(&store, 11).await.unwrap();
        assert_eq!(next, Some(1));
    }

    #[tokio::test]
    async fn oversized_counter_saturates_in_both_modes() {
        for mode in [CounterMode::ReadModifyWrite, CounterMode::Atomic] {
            let store = store_with_post(PostStatus::Publish).await;
            store
                .set_post_meta(11, DEFAULT_VIEWS_META_KEY, "99999999999999999999")
                .await
                .unwrap();
            let counter = ViewCounter::new(mode, DEFAULT_VIEWS_META_KEY);
            assert_eq!(counter.record_view(&store, 11).await.unwrap(), Some(i64::MAX));
            assert_eq!(counter.record_view(&store, 11).await.unwrap(), Some(i64::MAX));
        }
    }

    #[tokio::test]
    async fn unknown_or_unpublished_posts_are_ignored() {
        let store = store_with_post(PostStatus::Draft).await;
        let counter = ViewCounter::default();
        assert_eq!(counter.record_view(&store, 11).await.unwrap(), None);
        assert_eq!(counter.record_view(&store, 0).await.unwrap(), None);
        assert_eq!(counter.record_view(&store, 999).await.unwrap(), None);
        assert_eq!(
            store.get_post_meta(11, DEFAULT_VIEWS_META_KEY).await.unwrap(),
            None
        );
    }

    #[test]
    fn mode_deserializes_from_snake_case() {
        #[derive(Deserialize)]
        struct Wrap {
            mode: CounterMode,
        }
        let w: Wrap = serde_json::from_str(r#"{"mode": "atomic"}"#).unwrap();
        assert_eq!(w.mode, CounterMode::Atomic);
        assert_eq!(w.mode.as_str(), "atomic");
    }
}
