//! # press-core
//!
//! Store-agnostic logic for the press-api content service: the content
//! model, the permissive query builder, the client-facing projections, the
//! view counter, and the [`store::ContentStore`] abstraction.
//!
//! This crate contains no tokio, sqlx, or HTTP dependencies. The
//! `press-api` crate supplies the SQLite store and the HTTP surface.
//!
//! ```text
//!  raw params ──▶ query::build_filter ──▶ ContentStore::list_posts
//!                                              │
//!                                              ▼
//!                               projection::project_full / _compact
//! ```

pub mod models;
pub mod projection;
pub mod query;
pub mod store;
pub mod text;
pub mod views;
