//! `GET /most-viewed/`: top posts by view count, compact shape.
//!
//! Ignores pagination. Returns at most `[listing].most_viewed_limit`
//! items (10 by default), non-increasing in view count. Posts that have
//! never been viewed carry no counter and are left out.

use anyhow::Result;

use press_core::projection::{project_compact, CompactPost};
use press_core::store::ContentStore;

use crate::config::Config;
use crate::db;
use crate::sqlite_store::SqliteStore;

pub async fn most_viewed(store: &dyn ContentStore, config: &Config) -> Result<Vec<CompactPost>> {
    let items = store
        .most_viewed(&config.views.meta_key, config.listing.most_viewed_limit)
        .await?;
    let opts = config.projection_options();
    Ok(items.iter().map(|item| project_compact(item, &opts)).collect())
}

pub async fn run_most_viewed(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool.clone());

    let posts = most_viewed(&store, config).await?;
    println!("{}", serde_json::to_string_pretty(&posts)?);

    pool.close().await;
    Ok(())
}
