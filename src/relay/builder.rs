//! Connection builder
//!
//! Turns fetched rows plus the counts around the cursor into edges and page
//! info. Pure: no I/O happens here.

use super::types::{Connection, Counts, Edge, PageInfo};
use crate::args::PaginationArgs;
use crate::cursor::{CursorCodec, CursorFields};
use crate::error::{Error, Result};
use crate::value::{Node, Value};

/// Builds a [`Connection`] from one page of rows
#[derive(Debug, Clone)]
pub struct ConnectionBuilder<'a> {
    fields: &'a CursorFields,
    args: &'a PaginationArgs,
    counts: Counts,
}

impl<'a> ConnectionBuilder<'a> {
    /// Create a builder without counts
    pub fn new(fields: &'a CursorFields, args: &'a PaginationArgs) -> Self {
        Self {
            fields,
            args,
            counts: Counts::unknown(),
        }
    }

    /// Use the counts computed around the cursor
    #[must_use]
    pub fn with_counts(mut self, counts: Counts) -> Self {
        self.counts = counts;
        self
    }

    /// Reject arguments no connection can be built for
    pub fn validate(&self) -> Result<()> {
        if self.args.has_first() && self.args.has_last() {
            return Err(Error::validation("Cannot provide both first and last"));
        }
        if self.args.first.is_some_and(|n| n < 0) || self.args.last.is_some_and(|n| n < 0) {
            return Err(Error::validation("First and last must not be negative"));
        }
        Ok(())
    }

    /// Wrap a row in an edge, encoding its cursor
    ///
    /// Fails when the row has no usable id: absent, NULL or empty text.
    pub fn edge<N: Node>(&self, node: N) -> Result<Edge<N>> {
        let id = match node.field(self.fields.id_field()) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(value) => Some(value.to_string()),
        }
        .ok_or_else(|| Error::missing_field(self.fields.id_field()))?;

        // A missing sort field positions the row like NULL
        let order_value = if self.fields.is_composite() {
            Some(node.field(self.fields.order_by_field()).unwrap_or(Value::Null))
        } else {
            None
        };

        let cursor = CursorCodec::encode(&id, order_value.as_ref());
        Ok(Edge { node, cursor })
    }

    /// Build the connection
    ///
    /// Any row without an id aborts the whole build.
    pub fn build<N: Node>(self, rows: Vec<N>) -> Result<Connection<N>> {
        self.validate()?;

        let edges = rows
            .into_iter()
            .map(|node| self.edge(node))
            .collect::<Result<Vec<_>>>()?;

        let page_info = PageInfo::from_edges(
            &edges,
            self.has_next_page(edges.len() as u64),
            self.has_previous_page(),
        );

        Ok(Connection {
            edges,
            page_info,
            total_count: self.total_count(),
            current_count: self.counts.current,
            previous_count: self.counts.previous,
        })
    }

    /// `current + previous`, plus the cursor row when a cursor delimits the window
    pub fn total_count(&self) -> Option<u64> {
        let (current, previous) = (self.counts.current?, self.counts.previous?);
        Some(current + previous + u64::from(self.args.has_cursor()))
    }

    /// Whether rows precede this page
    pub fn has_previous_page(&self) -> bool {
        self.counts.previous.is_some_and(|p| p > 0)
    }

    /// Whether more rows follow this page
    ///
    /// Without counts, a full page is taken to mean more rows exist.
    pub fn has_next_page(&self, returned: u64) -> bool {
        if returned == 0 {
            return false;
        }

        let first = self.args.first.and_then(|n| u64::try_from(n).ok());
        let last = self.args.last.and_then(|n| u64::try_from(n).ok());

        if self.counts.is_unknown() {
            return first.is_some_and(|n| returned >= n) || last.is_some_and(|n| returned >= n);
        }

        let current = self.counts.current;
        let more_after = returned >= self.args.limit() && greater(current, first);
        let more_before = last.is_some()
            && greater(current, last)
            && self.counts.previous.is_some_and(|p| p != 0);

        more_after || more_before
    }
}

fn greater(left: Option<u64>, right: Option<u64>) -> bool {
    matches!((left, right), (Some(l), Some(r)) if l > r)
}
