//! Relay connection module
//!
//! Edges, page info and the builder that derives them from a page of rows
//! and the counts around its cursor.

mod builder;
mod types;

pub use builder::ConnectionBuilder;
pub use types::{Connection, Counts, Edge, PageInfo};
