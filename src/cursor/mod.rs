//! Cursor module
//!
//! Opaque page-position tokens and their decoded form.
//!
//! # Overview
//!
//! - `CursorCodec` - encodes an (id, sort value) pair into a base64url token and back
//! - `Cursor` - a decoded cursor plus the side of the window it delimits
//! - `CursorFields` - names of the tiebreak id field and the sort field

mod codec;
mod types;

pub use codec::{CursorCodec, CursorFieldFormat, SEPARATOR};
pub use types::{Cursor, CursorDirection, CursorFields, DecodedCursor};
