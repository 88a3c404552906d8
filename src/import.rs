//! Content import.
//!
//! Loads [`ImportBundle`] JSON documents into the store. The path may be a
//! single `.json` file or a directory, in which case every `.json` file
//! beneath it is imported in path order. Re-importing is an upsert:
//! existing posts keep meta keys the bundle does not mention, so view
//! counters survive a refresh of the content.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use press_core::models::{ImportBundle, ImportSummary};
use press_core::store::ContentStore;

use crate::config::Config;
use crate::db;
use crate::migrate;
use crate::sqlite_store::SqliteStore;

/// Resolves `path` to the list of bundle files to import.
pub fn bundle_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        anyhow::bail!("import path does not exist: {}", path.display());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_json = entry
            .path()
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if is_json {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

pub fn read_bundle(path: &Path) -> Result<ImportBundle> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read import file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse import file: {}", path.display()))
}

/// Imports every bundle under `path`, returning the summed counts.
pub async fn import_path(store: &dyn ContentStore, path: &Path) -> Result<ImportSummary> {
    let files = bundle_files(path)?;
    if files.is_empty() {
        tracing::warn!("no .json files found under {}", path.display());
    }

    let mut total = ImportSummary::default();
    for file in &files {
        let bundle = read_bundle(file)?;
        let summary = store.import(&bundle).await?;
        tracing::info!(
            file = %file.display(),
            categories = summary.categories,
            tags = summary.tags,
            posts = summary.posts,
            "imported bundle"
        );
        total.categories += summary.categories;
        total.tags += summary.tags;
        total.posts += summary.posts;
    }
    Ok(total)
}

/// CLI entry point for `press import <path>`.
pub async fn run_import(config: &Config, path: &Path) -> Result<()> {
    let pool = db::connect(config).await?;
    migrate::migrate_pool(&pool).await?;
    let store = SqliteStore::new(pool.clone());

    let summary = import_path(&store, path).await?;
    pool.close().await;

    println!(
        "Imported {} categories, {} tags, {} posts.",
        summary.categories, summary.tags, summary.posts
    );
    Ok(())
}
