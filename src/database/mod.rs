//! Database support via DuckDB
//!
//! This module provides a [`QueryEngine`](crate::query::QueryEngine) backed
//! by DuckDB, plus the SQL renderer it uses.

mod engine;
mod sql;

pub use engine::DuckDbEngine;
pub use sql::{quote_ident, render_count, render_select, SqlQuery};
