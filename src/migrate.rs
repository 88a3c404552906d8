//! Schema creation.
//!
//! The layout mirrors a classic blog store: posts, taxonomy terms shared
//! by categories and tags, a relationship table, and free-form key/value
//! metadata for posts and terms. The view counter is just one post meta
//! row. Every statement is idempotent, so `press init` can be re-run.

use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    migrate_pool(&pool).await?;
    pool.close().await;
    Ok(())
}

pub async fn migrate_pool(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS posts (
            id INTEGER PRIMARY KEY,
            post_type TEXT NOT NULL DEFAULT 'post',
            status TEXT NOT NULL DEFAULT 'publish',
            title TEXT NOT NULL,
            body TEXT NOT NULL DEFAULT '',
            excerpt TEXT,
            published_at INTEGER NOT NULL,
            comment_count INTEGER NOT NULL DEFAULT 0,
            thumbnail_url TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Categories and tags share one ID space, told apart by `taxonomy`.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS terms (
            id INTEGER PRIMARY KEY,
            taxonomy TEXT NOT NULL CHECK (taxonomy IN ('category', 'post_tag')),
            name TEXT NOT NULL,
            slug TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS term_relationships (
            post_id INTEGER NOT NULL,
            term_id INTEGER NOT NULL,
            PRIMARY KEY (post_id, term_id),
            FOREIGN KEY (post_id) REFERENCES posts(id) ON DELETE CASCADE,
            FOREIGN KEY (term_id) REFERENCES terms(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS post_meta (
            post_id INTEGER NOT NULL,
            meta_key TEXT NOT NULL,
            meta_value TEXT NOT NULL,
            PRIMARY KEY (post_id, meta_key),
            FOREIGN KEY (post_id) REFERENCES posts(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS term_meta (
            term_id INTEGER NOT NULL,
            meta_key TEXT NOT NULL,
            meta_value TEXT NOT NULL,
            PRIMARY KEY (term_id, meta_key),
            FOREIGN KEY (term_id) REFERENCES terms(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_posts_published_at ON posts(published_at DESC)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_term_relationships_term ON term_relationships(term_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_post_meta_key ON post_meta(meta_key)")
        .execute(pool)
        .await?;

    Ok(())
}
