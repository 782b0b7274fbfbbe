// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Relay Pagination
//!
//! Relay-style cursor pagination over relational query engines: "first N
//! after cursor X" and "last N before cursor Y", returned as a connection of
//! edges plus page info, with stable ordering even when the sort column has
//! duplicate values.
//!
//! ## Features
//!
//! - **Opaque cursors**: base64url tokens carrying the row id and, when
//!   sorting by another column, its typed sort value
//! - **Seek-method predicates**: `(sort, id)` comparisons instead of `OFFSET`
//! - **Forward and backward paging**: `first`/`after` and `last`/`before`
//!   in either sort order
//! - **Counts**: optional current/previous counts for `totalCount` and exact
//!   `hasNextPage`/`hasPreviousPage`
//! - **Pluggable engines**: anything implementing [`QueryEngine`]; an
//!   in-memory engine and a DuckDB engine are included
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use relay_pagination::{
//!     DuckDbEngine, PaginationArgs, PaginationConfig, PaginationFactory, TableMetadata,
//! };
//!
//! #[tokio::main]
//! async fn main() -> relay_pagination::Result<()> {
//!     let engine = DuckDbEngine::open("app.duckdb")?.with_table(
//!         TableMetadata::new("tasks")
//!             .with_columns(["id", "name", "created_at"])
//!             .with_primary_key("id")
//!             .with_create_date_column("created_at"),
//!     )?;
//!     let factory = PaginationFactory::new(engine, PaginationConfig::default())?;
//!
//!     let page = factory.paginate("tasks", PaginationArgs::new().first(10)).await?;
//!     let next = factory
//!         .paginate("tasks", PaginationArgs::new().first(10).after(page.page_info.end_cursor))
//!         .await?;
//!     println!("{}", serde_json::to_string_pretty(&next)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │    PaginationFactory → PaginationService (one per request)     │
//! │    setup(query, args) → get_many() / get_many_with_count()     │
//! └────────────────────────────────────────────────────────────────┘
//!                               │
//! ┌──────────────┬──────────────┴──────────────┬───────────────────┐
//! │ Cursor       │ Query                       │ Relay             │
//! ├──────────────┼─────────────────────────────┼───────────────────┤
//! │ Codec        │ QuerySpec / Predicate       │ ConnectionBuilder │
//! │ Cursor       │ Operator algebra            │ Edge / PageInfo   │
//! │ CursorFields │ QueryAdapter → QueryEngine  │ Connection        │
//! └──────────────┴─────────────────────────────┴───────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for relay pagination
pub mod error;

/// Common types and type aliases
pub mod types;

/// Dynamically typed values and row field access
pub mod value;

/// Pagination configuration
pub mod config;

/// Relay pagination arguments
pub mod args;

/// Cursor encoding and cursor value objects
pub mod cursor;

/// Queries, engines and the query adapter
pub mod query;

/// DuckDB query engine
pub mod database;

/// Relay connection types and builder
pub mod relay;

/// Pagination service and factory
pub mod service;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use args::PaginationArgs;
pub use config::{PaginationConfig, DEFAULT_LIMIT};
pub use cursor::{Cursor, CursorCodec, CursorFields};
pub use database::DuckDbEngine;
pub use query::{MemoryEngine, Predicate, QueryEngine, QuerySpec, TableMetadata};
pub use relay::{Connection, Edge, PageInfo};
pub use service::{PaginationFactory, PaginationService};
pub use value::{Node, Value};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
