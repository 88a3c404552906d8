//! # Press API
//!
//! A read-mostly content API that serves blog posts, categories, and a
//! most-viewed ranking as JSON to mobile clients, and counts a view each
//! time a single post page is rendered.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌──────────┐
//! │ JSON import │──▶│ ContentStore │◀──│  SQLite   │
//! └─────────────┘   └──────┬───────┘   └──────────┘
//!                          │
//!           ┌──────────────┼──────────────┐
//!           ▼              ▼              ▼
//!     ┌──────────┐   ┌──────────┐   ┌──────────┐
//!     │  query   │   │projection│   │  views   │
//!     └────┬─────┘   └────┬─────┘   └────┬─────┘
//!          └──────────────┼──────────────┘
//!                ┌────────┴────────┐
//!                ▼                 ▼
//!           ┌──────────┐     ┌──────────┐
//!           │   CLI    │     │   HTTP   │
//!           │ (press)  │     │  (axum)  │
//!           └──────────┘     └──────────┘
//! ```
//!
//! Domain types, parameter coercion, response shapes, and the view
//! counter live in the `press-core` crate. This crate adds the SQLite
//! backend, configuration, the CLI commands, and the HTTP server.
//!
//! ## Quick Start
//!
//! ```bash
//! press init                         # create database
//! press import ./content/            # load JSON bundles
//! press posts --search recipe        # same listing the API serves
//! press serve                        # start HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |
//! | [`sqlite_store`] | SQLite `ContentStore` backend |
//! | [`import`] | JSON bundle import |
//! | [`posts`] | General post listing |
//! | [`categories`] | Category index |
//! | [`most_viewed`] | Most-viewed ranking |
//! | [`render`] | Single-post render and view recording |
//! | [`server`] | HTTP server |

pub mod categories;
pub mod config;
pub mod db;
pub mod import;
pub mod migrate;
pub mod most_viewed;
pub mod posts;
pub mod render;
pub mod server;
pub mod sqlite_store;
