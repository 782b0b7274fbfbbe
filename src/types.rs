//! Common types used throughout relay pagination
//!
//! This module contains the small enums shared by the cursor codec,
//! the query adapter and the result builder, plus a few type aliases.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// A fetched row keyed by column name
pub type Record = HashMap<String, Value>;

// ============================================================================
// Query Order
// ============================================================================

/// Sort direction of a query
///
/// The default is ascending. Callers that want descending connections set it
/// explicitly, either per request or through `PaginationConfig::default_order`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QueryOrder {
    /// Ascending order (smallest first)
    #[default]
    Asc,
    /// Descending order (largest first)
    Desc,
}

impl QueryOrder {
    /// The opposite direction
    pub fn reverse(self) -> Self {
        match self {
            QueryOrder::Asc => QueryOrder::Desc,
            QueryOrder::Desc => QueryOrder::Asc,
        }
    }

    /// SQL keyword for this direction
    pub fn as_sql(self) -> &'static str {
        match self {
            QueryOrder::Asc => "ASC",
            QueryOrder::Desc => "DESC",
        }
    }
}

impl fmt::Display for QueryOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

// ============================================================================
// Nulls Ordering
// ============================================================================

/// Placement of NULL values in an ORDER BY
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullsOrder {
    /// NULLs sort before every value
    First,
    /// NULLs sort after every value
    Last,
}

impl NullsOrder {
    /// SQL clause for this policy
    pub fn as_sql(self) -> &'static str {
        match self {
            NullsOrder::First => "NULLS FIRST",
            NullsOrder::Last => "NULLS LAST",
        }
    }

    /// Policy that mirrors this one when the sort order is reversed
    pub fn reverse(self) -> Self {
        match self {
            NullsOrder::First => NullsOrder::Last,
            NullsOrder::Last => NullsOrder::First,
        }
    }
}

// ============================================================================
// Comparison Operator
// ============================================================================

/// Comparison operator used in cursor predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `=`
    Eq,
}

impl Comparison {
    /// The operator selecting the other side of a cursor
    ///
    /// `Eq` has no opposite side and maps to itself.
    pub fn opposite(self) -> Self {
        match self {
            Comparison::Gt => Comparison::Lt,
            Comparison::Lt => Comparison::Gt,
            Comparison::Eq => Comparison::Eq,
        }
    }

    /// SQL symbol for this operator
    pub fn as_sql(self) -> &'static str {
        match self {
            Comparison::Gt => ">",
            Comparison::Lt => "<",
            Comparison::Eq => "=",
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

// ============================================================================
// Paging Direction
// ============================================================================

/// Direction in which the client walks the connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PagingDirection {
    /// Towards larger offsets (`after`, or `first` without a cursor)
    Forward,
    /// Towards smaller offsets (`before`, or `last` without a cursor)
    Backward,
}

impl PagingDirection {
    /// The other direction
    pub fn opposite(self) -> Self {
        match self {
            PagingDirection::Forward => PagingDirection::Backward,
            PagingDirection::Backward => PagingDirection::Forward,
        }
    }
}
