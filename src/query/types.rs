//! Query types
//!
//! A [`QuerySpec`] is plain data: the table, a conjunction of predicates, the
//! ORDER BY list and an optional limit. Every `with_*` method consumes the
//! query and returns a new one, so the window query and both count queries are
//! derived from the same base without sharing any mutable builder.

use crate::error::{Error, Result};
use crate::types::{Comparison, NullsOrder, QueryOrder};
use crate::value::{Node, Value};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

// ============================================================================
// Predicates
// ============================================================================

/// A boolean filter expression
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `field <op> value`
    Compare {
        field: String,
        op: Comparison,
        value: Value,
    },
    /// `field IS NULL`, also true when the row lacks the field
    IsNull(String),
    /// `field IS NOT NULL`
    IsNotNull(String),
    /// All branches hold
    And(Vec<Predicate>),
    /// Any branch holds
    Or(Vec<Predicate>),
}

impl Predicate {
    /// `field <op> value`
    pub fn compare(field: impl Into<String>, op: Comparison, value: impl Into<Value>) -> Self {
        Predicate::Compare {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// `field = value`
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, Comparison::Eq, value)
    }

    /// `field IS NULL`
    pub fn is_null(field: impl Into<String>) -> Self {
        Predicate::IsNull(field.into())
    }

    /// `field IS NOT NULL`
    pub fn is_not_null(field: impl Into<String>) -> Self {
        Predicate::IsNotNull(field.into())
    }

    /// Conjunction
    pub fn and(branches: Vec<Predicate>) -> Self {
        Predicate::And(branches)
    }

    /// Disjunction
    pub fn or(branches: Vec<Predicate>) -> Self {
        Predicate::Or(branches)
    }

    /// Evaluate against a row with SQL semantics: comparisons involving NULL
    /// or incomparable types are false
    pub fn matches<N: Node + ?Sized>(&self, node: &N) -> bool {
        match self {
            Predicate::Compare { field, op, value } => {
                let Some(actual) = node.field(field) else {
                    return false;
                };
                let expected = match op {
                    Comparison::Gt => Ordering::Greater,
                    Comparison::Lt => Ordering::Less,
                    Comparison::Eq => Ordering::Equal,
                };
                actual.compare(value) == Some(expected)
            }
            Predicate::IsNull(field) => node.field(field).map_or(true, |v| v.is_null()),
            Predicate::IsNotNull(field) => node.field(field).is_some_and(|v| !v.is_null()),
            Predicate::And(branches) => branches.iter().all(|p| p.matches(node)),
            Predicate::Or(branches) => branches.iter().any(|p| p.matches(node)),
        }
    }

    /// Names of every field this predicate reads
    pub fn fields(&self) -> Vec<&str> {
        match self {
            Predicate::Compare { field, .. }
            | Predicate::IsNull(field)
            | Predicate::IsNotNull(field) => vec![field.as_str()],
            Predicate::And(branches) | Predicate::Or(branches) => {
                branches.iter().flat_map(Predicate::fields).collect()
            }
        }
    }
}

// ============================================================================
// Ordering
// ============================================================================

/// One ORDER BY term
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    /// Column to sort by
    pub field: String,
    /// Sort direction
    pub order: QueryOrder,
    /// NULL placement, engine default when absent
    pub nulls: Option<NullsOrder>,
}

impl OrderBy {
    /// Create a term with the engine's NULL placement
    pub fn new(field: impl Into<String>, order: QueryOrder) -> Self {
        Self {
            field: field.into(),
            order,
            nulls: None,
        }
    }

    /// Set the NULL placement
    #[must_use]
    pub fn with_nulls(mut self, nulls: NullsOrder) -> Self {
        self.nulls = Some(nulls);
        self
    }

    /// Same term sorted the other way, NULL placement mirrored
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            field: self.field.clone(),
            order: self.order.reverse(),
            nulls: self.nulls.map(NullsOrder::reverse),
        }
    }
}

// ============================================================================
// Query
// ============================================================================

/// Immutable description of a query against one table
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    table: String,
    filters: Vec<Predicate>,
    order_by: Vec<OrderBy>,
    limit: Option<u64>,
}

impl QuerySpec {
    /// Select every row of a table
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            filters: Vec::new(),
            order_by: Vec::new(),
            limit: None,
        }
    }

    /// Table name
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Filters, combined with AND
    pub fn filters(&self) -> &[Predicate] {
        &self.filters
    }

    /// ORDER BY terms, most significant first
    pub fn order_by(&self) -> &[OrderBy] {
        &self.order_by
    }

    /// Row limit
    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    /// Most significant ORDER BY term
    pub fn primary_order(&self) -> Option<&OrderBy> {
        self.order_by.first()
    }

    /// Add a filter
    #[must_use]
    pub fn with_filter(mut self, predicate: Predicate) -> Self {
        self.filters.push(predicate);
        self
    }

    /// Add an equality filter
    #[must_use]
    pub fn with_where(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with_filter(Predicate::eq(field, value))
    }

    /// Append an ORDER BY term
    #[must_use]
    pub fn with_order_by(mut self, field: impl Into<String>, order: QueryOrder) -> Self {
        self.order_by.push(OrderBy::new(field, order));
        self
    }

    /// Append a prepared ORDER BY term
    #[must_use]
    pub fn with_order_term(mut self, term: OrderBy) -> Self {
        self.order_by.push(term);
        self
    }

    /// Set the row limit
    #[must_use]
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Drop the row limit
    #[must_use]
    pub fn without_limit(mut self) -> Self {
        self.limit = None;
        self
    }

    /// Drop every ORDER BY term
    #[must_use]
    pub fn without_order(mut self) -> Self {
        self.order_by.clear();
        self
    }
}

impl From<&str> for QuerySpec {
    fn from(table: &str) -> Self {
        Self::new(table)
    }
}

impl From<String> for QuerySpec {
    fn from(table: String) -> Self {
        Self::new(table)
    }
}

// ============================================================================
// Table Metadata
// ============================================================================

/// What the pagination core needs to know about a table
///
/// `columns` may be left empty for engines that discover columns themselves;
/// the DuckDB engine requires it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMetadata {
    /// Table name, optionally schema-qualified
    pub table: String,

    /// Column names, in select order
    #[serde(default)]
    pub columns: Vec<String>,

    /// Primary key columns
    #[serde(default)]
    pub primary_key: Vec<String>,

    /// Column set when a row is created
    #[serde(default)]
    pub create_date_column: Option<String>,

    /// Column set when a row is updated
    #[serde(default)]
    pub update_date_column: Option<String>,

    /// Declared indexes, each a list of columns
    #[serde(default)]
    pub indexes: Vec<Vec<String>>,

    /// Declared unique constraints, each a list of columns
    #[serde(default)]
    pub uniques: Vec<Vec<String>>,
}

impl TableMetadata {
    /// Create metadata for a table
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    /// Set the column list
    #[must_use]
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Set a single-column primary key
    #[must_use]
    pub fn with_primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key = vec![column.into()];
        self
    }

    /// Set the creation timestamp column
    #[must_use]
    pub fn with_create_date_column(mut self, column: impl Into<String>) -> Self {
        self.create_date_column = Some(column.into());
        self
    }

    /// Set the update timestamp column
    #[must_use]
    pub fn with_update_date_column(mut self, column: impl Into<String>) -> Self {
        self.update_date_column = Some(column.into());
        self
    }

    /// Declare an index
    #[must_use]
    pub fn with_index<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.indexes
            .push(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Declare a unique constraint
    #[must_use]
    pub fn with_unique<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.uniques
            .push(columns.into_iter().map(Into::into).collect());
        self
    }

    /// First primary key column
    pub fn primary_column(&self) -> Option<&str> {
        self.primary_key.first().map(String::as_str)
    }

    /// Creation timestamp column, falling back to the update timestamp column
    pub fn date_column(&self) -> Option<&str> {
        self.create_date_column
            .as_deref()
            .or(self.update_date_column.as_deref())
    }

    /// Whether the table has this column
    ///
    /// Always true when the column list was not declared.
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.is_empty() || self.columns.iter().any(|c| c == column)
    }

    /// Columns covered by the primary key, an index or a unique constraint
    pub fn indexed_fields(&self) -> HashSet<&str> {
        self.primary_key
            .iter()
            .chain(self.indexes.iter().flatten())
            .chain(self.uniques.iter().flatten())
            .map(String::as_str)
            .collect()
    }

    /// Whether any index information was declared at all
    pub fn declares_indexes(&self) -> bool {
        !self.primary_key.is_empty() || !self.indexes.is_empty() || !self.uniques.is_empty()
    }

    /// Check that every referenced column is declared
    pub fn validate(&self) -> Result<()> {
        if self.table.trim().is_empty() {
            return Err(Error::config("Table metadata has an empty table name"));
        }

        let referenced = self
            .primary_key
            .iter()
            .chain(self.create_date_column.iter())
            .chain(self.update_date_column.iter())
            .chain(self.indexes.iter().flatten())
            .chain(self.uniques.iter().flatten());

        for column in referenced {
            if !self.has_column(column) {
                return Err(Error::config(format!(
                    "Table '{}' references undeclared column '{column}'",
                    self.table
                )));
            }
        }

        Ok(())
    }
}
