//! Relay connection types
//!
//! Serialised with camelCase keys so a connection can be returned as-is from
//! a GraphQL or JSON API.

use serde::{Deserialize, Serialize};

/// One row of a connection with the cursor pointing at it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge<N> {
    /// The row
    pub node: N,
    /// Opaque position of the row
    pub cursor: String,
}

/// Page metadata of a connection
///
/// The cursors are empty strings, not absent, when the page has no edges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Cursor of the first edge
    pub start_cursor: String,
    /// Cursor of the last edge
    pub end_cursor: String,
    /// Whether more rows follow this page
    pub has_next_page: bool,
    /// Whether rows precede this page
    pub has_previous_page: bool,
}

impl PageInfo {
    /// Page metadata for a list of edges, with the empty-string sentinel
    /// cursors when there are none
    pub fn from_edges<N>(edges: &[Edge<N>], has_next_page: bool, has_previous_page: bool) -> Self {
        Self {
            start_cursor: edges.first().map(|e| e.cursor.clone()).unwrap_or_default(),
            end_cursor: edges.last().map(|e| e.cursor.clone()).unwrap_or_default(),
            has_next_page,
            has_previous_page,
        }
    }
}

/// A page of rows in Relay connection shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<N> {
    /// Rows of the page, in the order requested
    pub edges: Vec<Edge<N>>,
    /// Page metadata
    pub page_info: PageInfo,
    /// Number of rows across all pages, when counts were computed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
    /// Rows on the requested side of the cursor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_count: Option<u64>,
    /// Rows on the other side of the cursor, excluding the cursor row
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_count: Option<u64>,
}

impl<N> Connection<N> {
    /// Rows of the page, without cursors
    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.edges.iter().map(|e| &e.node)
    }

    /// Consume the connection, keeping only the rows
    pub fn into_nodes(self) -> Vec<N> {
        self.edges.into_iter().map(|e| e.node).collect()
    }

    /// Whether the page has no rows
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Number of rows on the page
    pub fn len(&self) -> usize {
        self.edges.len()
    }
}

/// Counts around the cursor, `None` when not computed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    /// Rows on the requested side of the cursor
    pub current: Option<u64>,
    /// Rows on the other side, excluding the cursor row
    pub previous: Option<u64>,
}

impl Counts {
    /// Both counts computed
    pub fn known(current: u64, previous: u64) -> Self {
        Self {
            current: Some(current),
            previous: Some(previous),
        }
    }

    /// No counts computed
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Whether neither count was computed
    pub fn is_unknown(&self) -> bool {
        self.current.is_none() && self.previous.is_none()
    }
}
