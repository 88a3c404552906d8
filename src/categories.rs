//! `GET /categories/`: every category with its optional icon.
//!
//! No parameters, no pagination: the full category set is returned on
//! every call.

use anyhow::Result;

use press_core::projection::{project_category, CategoryResponse};
use press_core::store::ContentStore;

use crate::config::Config;
use crate::db;
use crate::sqlite_store::SqliteStore;

pub async fn list_categories(store: &dyn ContentStore) -> Result<Vec<CategoryResponse>> {
    let categories = store.list_categories().await?;
    Ok(categories.iter().map(project_category).collect())
}

pub async fn run_categories(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool.clone());

    let categories = list_categories(&store).await?;
    println!("{}", serde_json::to_string_pretty(&categories)?);

    pool.close().await;
    Ok(())
}
