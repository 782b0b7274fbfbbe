//! Query module
//!
//! Immutable queries, the engine they are executed by, and the
//! adapter that derives cursor windows and counts from a base query.
//!
//! # Overview
//!
//! ```text
//! base QuerySpec + PaginationArgs + Cursor
//!        │
//!        ▼
//!   QueryAdapter ──► window query   (cursor predicate, ORDER BY, LIMIT)
//!                ├─► current count  (cursor predicate)
//!                └─► previous count (opposite cursor predicate)
//!        │
//!        ▼
//!   QueryEngine (MemoryEngine, DuckDbEngine, ...)
//! ```

mod adapter;
mod engine;
mod memory;
mod operators;
mod types;

pub use adapter::{resolve_cursor_fields, PageWindow, QueryAdapter};
pub use engine::QueryEngine;
pub use memory::MemoryEngine;
pub use operators::{comparison_operator, cursor_predicate, effective_order, paging_direction};
pub use types::{OrderBy, Predicate, QuerySpec, TableMetadata};

#[cfg(test)]
mod tests;
