//! Single-post page render.
//!
//! Rendering one post is the only thing that counts a view. Listings and
//! the category index never touch the counter. The page itself is
//! deliberately plain: title, date, and the filtered content as text.

use anyhow::{bail, Result};

use press_core::models::ContentItem;
use press_core::projection::{filter_content, view_count};
use press_core::store::ContentStore;
use press_core::text::strip_all_tags;

use crate::config::Config;
use crate::db;
use crate::sqlite_store::SqliteStore;

/// A rendered single-post page.
#[derive(Debug, Clone)]
pub struct RenderedPost {
    pub item: ContentItem,
    /// Counter value after this render was recorded.
    pub views: i64,
    pub html: String,
}

/// Renders post `id` and records exactly one view for it.
///
/// Returns `Ok(None)` when `id` is not a published post; nothing is
/// recorded in that case.
pub async fn render_post(
    store: &dyn ContentStore,
    config: &Config,
    id: i64,
) -> Result<Option<RenderedPost>> {
    let item = match store.get_post(id).await? {
        Some(item) => item,
        None => return Ok(None),
    };

    let counter = config.view_counter();
    let views = match counter.record_view(store, id).await? {
        Some(v) => v,
        None => view_count(&item, counter.meta_key()),
    };
    tracing::debug!(post_id = id, views, mode = counter.mode().as_str(), "recorded view");

    let html = render_html(&item, &config.listing.date_format);
    Ok(Some(RenderedPost { item, views, html }))
}

fn render_html(item: &ContentItem, date_format: &str) -> String {
    let title = escape_html(&item.title);
    let date = item.published_at.format(date_format).to_string();
    let paragraphs: String = strip_all_tags(&filter_content(&item.body))
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| format!("<p>{}</p>\n", escape_html(p)))
        .collect();

    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
         <body>\n<article>\n<h1>{title}</h1>\n<time>{date}</time>\n{paragraphs}</article>\n\
         </body>\n</html>\n",
        title = title,
        date = escape_html(&date),
        paragraphs = paragraphs,
    )
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// CLI entry point for `press view <id>`: simulates one page render.
pub async fn run_view(config: &Config, id: i64) -> Result<()> {
    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool.clone());

    let rendered = render_post(&store, config, id).await?;
    pool.close().await;

    match rendered {
        Some(r) => {
            println!("post {}: \"{}\" views: {}", r.item.id, r.item.title, r.views);
            Ok(())
        }
        None => bail!("post not found: {}", id),
    }
}
