//! `GET /posts/`: the general listing.
//!
//! Raw query parameters → [`build_filter_with_default`] → store listing →
//! [`project_full`] per item. Used by both `press posts` and the HTTP
//! server.

use anyhow::Result;

use press_core::projection::{project_full, FullPost};
use press_core::query::{build_filter_with_default, RawParams};
use press_core::store::ContentStore;

use crate::config::Config;
use crate::db;
use crate::sqlite_store::SqliteStore;

/// Core listing function returning the response array.
pub async fn list_posts(
    store: &dyn ContentStore,
    config: &Config,
    raw: &RawParams,
) -> Result<Vec<FullPost>> {
    let filter = build_filter_with_default(raw, config.listing.default_per_page);
    tracing::debug!(?filter, "listing posts");

    let items = store.list_posts(&filter).await?;
    let opts = config.projection_options();
    Ok(items.iter().map(|item| project_full(item, &opts)).collect())
}

/// CLI entry point: builds raw parameters from flags, prints the JSON array.
pub async fn run_posts(config: &Config, raw: RawParams) -> Result<()> {
    let pool = db::connect(config).await?;
    let store = SqliteStore::with_default_per_page(pool.clone(), config.listing.default_per_page);

    let posts = list_posts(&store, config, &raw).await?;
    println!("{}", serde_json::to_string_pretty(&posts)?);

    pool.close().await;
    Ok(())
}
