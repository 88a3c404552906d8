//! # Press CLI (`press`)
//!
//! The `press` binary initializes the database, imports content, prints
//! the same JSON the API serves, simulates page renders, and starts the
//! HTTP server.
//!
//! ## Usage
//!
//! ```bash
//! press --config ./config/press.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `press init` | Create the SQLite database and run schema migrations |
//! | `press import <path>` | Import a JSON bundle file or a directory of them |
//! | `press posts` | Print the general post listing |
//! | `press categories` | Print every category |
//! | `press most-viewed` | Print the most-viewed ranking |
//! | `press view <id>` | Render one post, recording a view |
//! | `press serve` | Start the HTTP server |
//!
//! ## Examples
//!
//! ```bash
//! press init --config ./config/press.toml
//! press import ./content/ --config ./config/press.toml
//! press posts --search recipe --categories 3 --config ./config/press.toml
//! press serve --config ./config/press.toml
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use press_api::{categories, config, import, migrate, most_viewed, posts, render, server};
use press_core::query::RawParams;

/// Press: a read-mostly JSON content API for blog posts.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/press.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "press",
    about = "Press: a read-mostly JSON content API for blog posts",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/press.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Idempotent; running it on an existing database is safe.
    Init,

    /// Import content from a JSON bundle file or a directory of bundles.
    ///
    /// Existing posts and terms are updated in place. View counters are
    /// preserved unless the bundle sets them explicitly.
    Import {
        /// A `.json` file or a directory searched recursively for `.json` files.
        path: PathBuf,
    },

    /// Print the general post listing as JSON.
    ///
    /// Flags are passed through the same coercion as HTTP query
    /// parameters, so invalid values fall back to defaults.
    Posts {
        /// Free-text search over title, excerpt, and body.
        #[arg(long)]
        search: Option<String>,

        /// 1-based page number.
        #[arg(long, allow_hyphen_values = true)]
        page: Option<String>,

        /// Page size; negative returns every match.
        #[arg(long, allow_hyphen_values = true)]
        per_page: Option<String>,

        /// Restrict to one category id.
        #[arg(long)]
        categories: Option<String>,

        /// Restrict to one tag id.
        #[arg(long)]
        tags: Option<String>,
    },

    /// Print every category as JSON.
    Categories,

    /// Print the most-viewed ranking as JSON.
    MostViewed,

    /// Render a single post, recording one view.
    View {
        /// Post id.
        id: i64,
    },

    /// Start the HTTP server.
    ///
    /// Binds to `[server].bind` and serves the API under
    /// `[server].route_prefix`.
    Serve,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let cfg = config::load_config(&cli.config)?;
    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized successfully.");
        }
        Commands::Import { path } => {
            import::run_import(&cfg, &path).await?;
        }
        Commands::Posts {
            search,
            page,
            per_page,
            categories,
            tags,
        } => {
            let mut raw = RawParams::new();
            for (key, value) in [
                ("search", search),
                ("page", page),
                ("per_page", per_page),
                ("categories", categories),
                ("tags", tags),
            ] {
                if let Some(value) = value {
                    raw.insert(key.to_string(), value);
                }
            }
            posts::run_posts(&cfg, raw).await?;
        }
        Commands::Categories => {
            categories::run_categories(&cfg).await?;
        }
        Commands::MostViewed => {
            most_viewed::run_most_viewed(&cfg).await?;
        }
        Commands::View { id } => {
            render::run_view(&cfg, id).await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }
    Ok(())
}
