//! In-process query engine
//!
//! Evaluates a [`QuerySpec`] over rows held in memory with the same NULL and
//! comparison rules a SQL engine applies. Useful for tests and for paginating
//! data that is already loaded.

use super::engine::QueryEngine;
use super::types::{OrderBy, QuerySpec, TableMetadata};
use crate::error::{Error, Result};
use crate::types::{NullsOrder, QueryOrder};
use crate::value::{Node, Value};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct MemoryTable<N> {
    metadata: TableMetadata,
    rows: Vec<N>,
}

/// Query engine over in-memory rows
#[derive(Debug, Clone)]
pub struct MemoryEngine<N> {
    tables: HashMap<String, MemoryTable<N>>,
}

impl<N> Default for MemoryEngine<N> {
    fn default() -> Self {
        Self {
            tables: HashMap::new(),
        }
    }
}

impl<N> MemoryEngine<N> {
    /// Create an engine without tables
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table with its rows
    #[must_use]
    pub fn with_table(mut self, metadata: TableMetadata, rows: Vec<N>) -> Self {
        self.tables
            .insert(metadata.table.clone(), MemoryTable { metadata, rows });
        self
    }

    /// Append a row to a registered table
    pub fn insert(&mut self, table: &str, row: N) -> Result<()> {
        self.tables
            .get_mut(table)
            .ok_or_else(|| unknown_table(table))?
            .rows
            .push(row);
        Ok(())
    }

    /// Number of rows in a table
    pub fn row_count(&self, table: &str) -> usize {
        self.tables.get(table).map_or(0, |t| t.rows.len())
    }

    fn table(&self, name: &str) -> Result<&MemoryTable<N>> {
        self.tables.get(name).ok_or_else(|| unknown_table(name))
    }
}

fn unknown_table(name: &str) -> Error {
    Error::config(format!("Table '{name}' is not registered"))
}

/// NULLs sort last unless the term says otherwise, in either direction
fn compare_rows<N: Node>(a: &N, b: &N, order_by: &[OrderBy]) -> Ordering {
    for term in order_by {
        let left = a.field(&term.field).unwrap_or(Value::Null);
        let right = b.field(&term.field).unwrap_or(Value::Null);
        let nulls_first = term.nulls == Some(NullsOrder::First);

        let ordering = match (left.is_null(), right.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) if nulls_first => Ordering::Less,
            (true, false) => Ordering::Greater,
            (false, true) if nulls_first => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => {
                let ordering = left.compare(&right).unwrap_or(Ordering::Equal);
                match term.order {
                    QueryOrder::Asc => ordering,
                    QueryOrder::Desc => ordering.reverse(),
                }
            }
        };

        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

#[async_trait]
impl<N> QueryEngine for MemoryEngine<N>
where
    N: Node + Clone + Send + Sync + 'static,
{
    type Row = N;

    fn metadata(&self, table: &str) -> Option<TableMetadata> {
        self.tables.get(table).map(|t| t.metadata.clone())
    }

    async fn fetch(&self, query: &QuerySpec) -> Result<Vec<N>> {
        let table = self.table(query.table())?;

        let mut rows: Vec<N> = table
            .rows
            .iter()
            .filter(|row| query.filters().iter().all(|p| p.matches(*row)))
            .cloned()
            .collect();

        rows.sort_by(|a, b| compare_rows(a, b, query.order_by()));

        if let Some(limit) = query.limit() {
            rows.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }

        tracing::debug!(
            table = query.table(),
            rows = rows.len(),
            "Fetched rows from memory"
        );
        Ok(rows)
    }

    async fn count(&self, query: &QuerySpec) -> Result<u64> {
        let table = self.table(query.table())?;
        let count = table
            .rows
            .iter()
            .filter(|row| query.filters().iter().all(|p| p.matches(*row)))
            .count();
        Ok(count as u64)
    }
}
