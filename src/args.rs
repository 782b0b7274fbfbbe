//! Relay pagination arguments
//!
//! `first`/`after` page forward, `last`/`before` page backward. The derived
//! flags (`has_cursor`, `has_first`, `has_last`) are plain methods over the
//! stored fields and are never stored themselves.

use crate::error::{Error, Result};
use crate::types::QueryOrder;
use serde::{Deserialize, Serialize};

/// Arguments of a Relay connection field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationArgs {
    /// Number of rows to return after the cursor
    #[serde(default)]
    pub first: Option<i64>,

    /// Number of rows to return before the cursor
    #[serde(default)]
    pub last: Option<i64>,

    /// Cursor to start after
    #[serde(default)]
    pub after: Option<String>,

    /// Cursor to end before
    #[serde(default)]
    pub before: Option<String>,

    /// Sort order override for this request
    #[serde(default)]
    pub order: Option<QueryOrder>,

    /// Sort field override for this request
    #[serde(default)]
    pub order_by: Option<String>,
}

impl PaginationArgs {
    /// Create empty arguments
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `first`
    #[must_use]
    pub fn first(mut self, first: i64) -> Self {
        self.first = Some(first);
        self
    }

    /// Set `last`
    #[must_use]
    pub fn last(mut self, last: i64) -> Self {
        self.last = Some(last);
        self
    }

    /// Set `after`
    #[must_use]
    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.after = Some(cursor.into());
        self
    }

    /// Set `before`
    #[must_use]
    pub fn before(mut self, cursor: impl Into<String>) -> Self {
        self.before = Some(cursor.into());
        self
    }

    /// Set the sort order
    #[must_use]
    pub fn order(mut self, order: QueryOrder) -> Self {
        self.order = Some(order);
        self
    }

    /// Set the sort field
    #[must_use]
    pub fn order_by(mut self, field: impl Into<String>) -> Self {
        self.order_by = Some(field.into());
        self
    }

    /// Apply the default page size when neither `first` nor `last` is set
    #[must_use]
    pub fn with_default_limit(mut self, default_limit: u32) -> Self {
        if self.first.is_none() && self.last.is_none() {
            self.first = Some(i64::from(default_limit));
        }
        self
    }

    /// Non-empty `after` cursor
    pub fn after_cursor(&self) -> Option<&str> {
        self.after.as_deref().filter(|s| !s.is_empty())
    }

    /// Non-empty `before` cursor
    pub fn before_cursor(&self) -> Option<&str> {
        self.before.as_deref().filter(|s| !s.is_empty())
    }

    /// Whether a cursor delimits the window
    pub fn has_cursor(&self) -> bool {
        self.after_cursor().is_some() || self.before_cursor().is_some()
    }

    /// Whether `first` was requested
    pub fn has_first(&self) -> bool {
        self.first.is_some()
    }

    /// Whether `last` was requested
    pub fn has_last(&self) -> bool {
        self.last.is_some()
    }

    /// Number of rows requested, zero if neither `first` nor `last` is set
    pub fn limit(&self) -> u64 {
        let first = self.first.unwrap_or(0).max(0);
        let last = self.last.unwrap_or(0).max(0);
        first.max(last) as u64
    }

    /// Reject argument combinations that cannot be paginated
    ///
    /// No query may run when this fails.
    pub fn validate(&self) -> Result<()> {
        if self.has_first() && self.has_last() {
            return Err(Error::validation("Cannot provide both first and last"));
        }

        if self.has_last() && !self.has_cursor() {
            return Err(Error::validation(
                "Cannot paginate backwards without a cursor",
            ));
        }

        if self.first.is_some_and(|first| first <= 0) {
            return Err(Error::validation("First must be a positive number"));
        }

        if self.last.is_some_and(|last| last <= 0) {
            return Err(Error::validation("Last must be a positive number"));
        }

        if self.order_by.as_deref().is_some_and(str::is_empty) {
            return Err(Error::validation("orderBy must not be empty"));
        }

        Ok(())
    }
}
