//! Query engine abstraction
//!
//! The pagination core never talks to a database directly. It derives
//! [`QuerySpec`] values and hands them to a [`QueryEngine`], which executes
//! them and returns rows that can be read through [`Node`].

use super::types::{QuerySpec, TableMetadata};
use crate::error::Result;
use crate::value::Node;
use async_trait::async_trait;

/// Executes queries
///
/// Implementations must honour every filter, the ORDER BY terms in order and
/// the limit. They are shared across requests, so they must not keep
/// per-request state.
#[async_trait]
pub trait QueryEngine: Send + Sync {
    /// Row type returned by `fetch`
    type Row: Node + Send + Sync;

    /// Metadata of a table, if the engine knows it
    fn metadata(&self, table: &str) -> Option<TableMetadata>;

    /// Run the query and return the matching rows
    async fn fetch(&self, query: &QuerySpec) -> Result<Vec<Self::Row>>;

    /// Count the rows matching the query's filters, ignoring order and limit
    async fn count(&self, query: &QuerySpec) -> Result<u64>;
}
