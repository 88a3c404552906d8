//! TOML configuration.
//!
//! ```toml
//! [db]
//! path = "./data/press.sqlite"
//!
//! [server]
//! bind = "127.0.0.1:8080"
//! route_prefix = "/myapp/v1"
//!
//! [listing]
//! default_per_page = 10
//! excerpt_words = 30
//! most_viewed_limit = 10
//! date_format = "%B %-d, %Y"
//!
//! [views]
//! mode = "read_modify_write"   # or "atomic"
//! meta_key = "post_views_count"
//! ```
//!
//! Only `[db]` and `[server].bind` are required.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use press_core::projection::{check_date_format, ProjectionOptions};
use press_core::query::DEFAULT_PER_PAGE;
use press_core::views::{CounterMode, ViewCounter, DEFAULT_VIEWS_META_KEY};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub listing: ListingConfig,
    #[serde(default)]
    pub views: ViewsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
    #[serde(default = "default_route_prefix")]
    pub route_prefix: String,
}

fn default_route_prefix() -> String {
    "/myapp/v1".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ListingConfig {
    #[serde(default = "default_per_page")]
    pub default_per_page: i64,
    #[serde(default = "default_excerpt_words")]
    pub excerpt_words: usize,
    #[serde(default = "default_most_viewed_limit")]
    pub most_viewed_limit: usize,
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            default_per_page: default_per_page(),
            excerpt_words: default_excerpt_words(),
            most_viewed_limit: default_most_viewed_limit(),
            date_format: default_date_format(),
        }
    }
}

fn default_per_page() -> i64 {
    DEFAULT_PER_PAGE
}
fn default_excerpt_words() -> usize {
    30
}
fn default_most_viewed_limit() -> usize {
    10
}
fn default_date_format() -> String {
    "%B %-d, %Y".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ViewsConfig {
    #[serde(default)]
    pub mode: CounterMode,
    #[serde(default = "default_meta_key")]
    pub meta_key: String,
}

impl Default for ViewsConfig {
    fn default() -> Self {
        Self {
            mode: CounterMode::default(),
            meta_key: default_meta_key(),
        }
    }
}

fn default_meta_key() -> String {
    DEFAULT_VIEWS_META_KEY.to_string()
}

impl Config {
    /// Projection settings derived from `[listing]` and `[views]`.
    pub fn projection_options(&self) -> ProjectionOptions {
        ProjectionOptions {
            excerpt_words: self.listing.excerpt_words,
            date_format: self.listing.date_format.clone(),
            views_meta_key: self.views.meta_key.clone(),
        }
    }

    pub fn view_counter(&self) -> ViewCounter {
        ViewCounter::new(self.views.mode, self.views.meta_key.clone())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Checks value ranges that serde cannot express.
pub fn validate(config: &Config) -> Result<()> {
    if config.listing.default_per_page < 1 {
        anyhow::bail!("listing.default_per_page must be >= 1");
    }
    if config.listing.excerpt_words == 0 {
        anyhow::bail!("listing.excerpt_words must be > 0");
    }
    if config.listing.most_viewed_limit == 0 {
        anyhow::bail!("listing.most_viewed_limit must be > 0");
    }
    check_date_format(&config.listing.date_format)
        .context("listing.date_format is not a valid strftime pattern")?;
    if config.views.meta_key.trim().is_empty() {
        anyhow::bail!("views.meta_key must not be empty");
    }

    let prefix = &config.server.route_prefix;
    if !prefix.is_empty() && (!prefix.starts_with('/') || prefix.ends_with('/')) {
        anyhow::bail!(
            "server.route_prefix must start with '/' and not end with '/': '{}'",
            prefix
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &str) -> Result<Config> {
        let content = format!(
            "[db]\npath = \"/tmp/press.sqlite\"\n\n[server]\nbind = \"127.0.0.1:0\"\n{}",
            extra
        );
        let config: Config = toml::from_str(&content)?;
        validate(&config)?;
        Ok(config)
    }

    #[test]
    fn defaults_apply() {
        let cfg = parse("").unwrap();
        assert_eq!(cfg.server.route_prefix, "/myapp/v1");
        assert_eq!(cfg.listing.default_per_page, 10);
        assert_eq!(cfg.listing.most_viewed_limit, 10);
        assert_eq!(cfg.views.mode, CounterMode::ReadModifyWrite);
        assert_eq!(cfg.views.meta_key, "post_views_count");
    }

    #[test]
    fn atomic_mode_parses() {
        let cfg = parse("[views]\nmode = \"atomic\"\n").unwrap();
        assert_eq!(cfg.view_counter().mode(), CounterMode::Atomic);
    }

    #[test]
    fn unknown_mode_rejected() {
        assert!(parse("[views]\nmode = \"eventual\"\n").is_err());
    }

    #[test]
    fn invalid_values_rejected() {
        assert!(parse("[listing]\ndefault_per_page = 0\n").is_err());
        assert!(parse("[listing]\nexcerpt_words = 0\n").is_err());
        assert!(parse("[listing]\ndate_format = \"%Q\"\n").is_err());
        assert!(parse("[listing]\ndate_format = \"%Y-%m-%d\"\n").is_ok());
    }

    #[test]
    fn route_prefix_shape_checked() {
        assert!(parse_prefix("/api").is_ok());
        assert!(parse_prefix("").is_ok());
        assert!(parse_prefix("api").is_err());
        assert!(parse_prefix("/api/").is_err());
    }

    fn parse_prefix(prefix: &str) -> Result<Config> {
        let content = format!(
            "[db]\npath = \"/tmp/press.sqlite\"\n\n[server]\nbind = \"127.0.0.1:0\"\nroute_prefix = \"{}\"\n",
            prefix
        );
        let config: Config = toml::from_str(&content)?;
        validate(&config)?;
        Ok(config)
    }
}
