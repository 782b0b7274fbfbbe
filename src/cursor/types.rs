//! Cursor types
//!
//! Decoded cursors are immutable and built fresh for every request.

use crate::error::{Error, Result};
use crate::value::Value;

/// Raw result of decoding a cursor token
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedCursor {
    /// Tiebreak id
    pub id: String,
    /// Sort-column value, absent for single-field cursors
    pub order_value: Option<Value>,
}

/// Which side of the window a cursor delimits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorDirection {
    /// Rows after the cursor (`after` argument)
    After,
    /// Rows before the cursor (`before` argument)
    Before,
    /// Not tied to an argument, e.g. a cursor built for an edge
    #[default]
    Unknown,
}

/// A decoded cursor with its direction
#[derive(Debug, Clone, PartialEq)]
pub struct Cursor {
    id: String,
    order_value: Option<Value>,
    direction: CursorDirection,
}

impl Cursor {
    /// Create a cursor without a direction
    ///
    /// A sort value whose canonical text equals the id is dropped, collapsing
    /// the cursor to a single field. A NULL sort value is kept.
    pub fn new(id: impl Into<String>, order_value: Option<Value>) -> Self {
        Self::with_direction(id, order_value, CursorDirection::Unknown)
    }

    /// Create a cursor from an `after` argument
    pub fn from_after(id: impl Into<String>, order_value: Option<Value>) -> Self {
        Self::with_direction(id, order_value, CursorDirection::After)
    }

    /// Create a cursor from a `before` argument
    pub fn from_before(id: impl Into<String>, order_value: Option<Value>) -> Self {
        Self::with_direction(id, order_value, CursorDirection::Before)
    }

    fn with_direction(
        id: impl Into<String>,
        order_value: Option<Value>,
        direction: CursorDirection,
    ) -> Self {
        let id = id.into();
        let order_value = order_value.filter(|v| v.is_null() || v.to_string() != id);
        Self {
            id,
            order_value,
            direction,
        }
    }

    /// Tiebreak id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Sort-column value
    pub fn order_value(&self) -> Option<&Value> {
        self.order_value.as_ref()
    }

    /// Direction of this cursor
    pub fn direction(&self) -> CursorDirection {
        self.direction
    }

    /// Whether this cursor came from `after`
    pub fn is_after(&self) -> bool {
        self.direction == CursorDirection::After
    }

    /// Whether this cursor came from `before`
    pub fn is_before(&self) -> bool {
        self.direction == CursorDirection::Before
    }

    /// Whether the cursor carries a sort value distinct from its id
    ///
    /// Controls whether the cursor predicate compares one column or two.
    pub fn ordering_by_multiple_fields(&self) -> bool {
        self.order_value.is_some()
    }
}

/// Names of the fields that supply a row's cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorFields {
    id_field: String,
    order_by_field: String,
}

impl CursorFields {
    /// Create a descriptor, rejecting empty field names
    pub fn new(id_field: impl Into<String>, order_by_field: impl Into<String>) -> Result<Self> {
        let fields = Self {
            id_field: id_field.into(),
            order_by_field: order_by_field.into(),
        };
        fields.validate()?;
        Ok(fields)
    }

    /// Descriptor that sorts by the id itself
    pub fn id_only(id_field: impl Into<String>) -> Result<Self> {
        let id_field = id_field.into();
        Self::new(id_field.clone(), id_field)
    }

    /// Tiebreak id field
    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    /// Primary sort field
    pub fn order_by_field(&self) -> &str {
        &self.order_by_field
    }

    /// Whether the sort field differs from the id field
    pub fn is_composite(&self) -> bool {
        self.id_field != self.order_by_field
    }

    /// Check that both field names are present
    pub fn validate(&self) -> Result<()> {
        if self.id_field.trim().is_empty() {
            return Err(Error::config("Invalid cursor fields: id field is empty"));
        }
        if self.order_by_field.trim().is_empty() {
            return Err(Error::config(
                "Invalid cursor fields: order by field is empty",
            ));
        }
        Ok(())
    }
}
