//! Cursor codec
//!
//! A cursor token is the base64url encoding of either the bare id, or
//! `<tag>:<sort value>` followed by [`SEPARATOR`] and the id. The tag tells
//! the decoder how to parse the sort value back. The id is everything after
//! the last separator, so sort values may contain the separator themselves.

use super::types::{Cursor, DecodedCursor};
use crate::error::{Error, Result};
use crate::value::Value;
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use serde_json::Number;

/// Separator between the tagged sort value and the id
pub const SEPARATOR: &str = "<!@@!>";

/// Type tag of an encoded sort value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorFieldFormat {
    /// Text, stored verbatim
    String,
    /// Number, stored in its JSON text form
    Number,
    /// Timestamp, stored as epoch milliseconds with an optional fraction
    Date,
    /// SQL NULL, stored without a value
    Null,
}

impl CursorFieldFormat {
    /// Tag written in front of the sort value
    pub fn tag(self) -> &'static str {
        match self {
            CursorFieldFormat::String => "string",
            CursorFieldFormat::Number => "number",
            CursorFieldFormat::Date => "date",
            CursorFieldFormat::Null => "null",
        }
    }

    /// Parse a tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "string" => Some(CursorFieldFormat::String),
            "number" => Some(CursorFieldFormat::Number),
            "date" => Some(CursorFieldFormat::Date),
            "null" => Some(CursorFieldFormat::Null),
            _ => None,
        }
    }

    /// Format used to store a value
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Number(_) => CursorFieldFormat::Number,
            Value::Timestamp(_) => CursorFieldFormat::Date,
            Value::Null => CursorFieldFormat::Null,
            Value::Bool(_) | Value::String(_) => CursorFieldFormat::String,
        }
    }
}

/// Encodes and decodes cursor tokens
///
/// Stateless; every method is a pure function of its input.
#[derive(Debug, Clone, Copy, Default)]
pub struct CursorCodec;

impl CursorCodec {
    /// Encode an id and an optional sort value
    ///
    /// Only the id is encoded when the sort value is absent or textually
    /// equal to the id. NULL is kept: it still positions the row.
    pub fn encode(id: &str, order_value: Option<&Value>) -> String {
        let order_value = order_value.filter(|v| v.is_null() || v.to_string() != id);

        let payload = match order_value {
            None => id.to_string(),
            Some(value) => format!("{}{SEPARATOR}{id}", Self::encode_order_value(value)),
        };

        URL_SAFE_NO_PAD.encode(payload.as_bytes())
    }

    /// Encode a cursor value object
    pub fn encode_cursor(cursor: &Cursor) -> String {
        Self::encode(cursor.id(), cursor.order_value())
    }

    /// Decode a token, degrading a malformed sort value to an id-only cursor
    ///
    /// Tokens that are not valid base64 or not UTF-8 are still rejected with
    /// a decode error carrying the token and the underlying cause.
    pub fn decode(token: &str) -> Result<DecodedCursor> {
        let payload = Self::decode_payload(token)?;
        match payload.rsplit_once(SEPARATOR) {
            None => Ok(DecodedCursor {
                id: payload,
                order_value: None,
            }),
            Some((order_part, id)) => {
                let id = Self::non_empty_id(token, id)?;
                let order_value = match Self::decode_order_value(order_part) {
                    Ok(value) => Some(value),
                    Err(message) => {
                        tracing::warn!(
                            cursor = token,
                            "Malformed cursor sort value ({message}), using id-only cursor"
                        );
                        None
                    }
                };
                Ok(DecodedCursor { id, order_value })
            }
        }
    }

    /// Decode a token, rejecting any malformed envelope
    pub fn decode_strict(token: &str) -> Result<DecodedCursor> {
        let payload = Self::decode_payload(token)?;
        match payload.rsplit_once(SEPARATOR) {
            None => Ok(DecodedCursor {
                id: payload,
                order_value: None,
            }),
            Some((order_part, id)) => {
                let id = Self::non_empty_id(token, id)?;
                let order_value = Self::decode_order_value(order_part)
                    .map_err(|message| Error::decode(token, message))?;
                Ok(DecodedCursor {
                    id,
                    order_value: Some(order_value),
                })
            }
        }
    }

    fn decode_payload(token: &str) -> Result<String> {
        let trimmed = token.trim_end_matches('=');
        let bytes = match URL_SAFE_NO_PAD.decode(trimmed) {
            Ok(bytes) => bytes,
            // Tokens minted with the standard alphabet are still accepted
            Err(url_safe_err) => STANDARD_NO_PAD
                .decode(trimmed)
                .map_err(|_| Error::decode_with_source(token, url_safe_err))?,
        };

        let payload = String::from_utf8(bytes).map_err(|e| Error::decode_with_source(token, e))?;
        if payload.is_empty() {
            return Err(Error::decode(token, "cursor has an empty id"));
        }
        Ok(payload)
    }

    fn non_empty_id(token: &str, id: &str) -> Result<String> {
        if id.is_empty() {
            return Err(Error::decode(token, "cursor has an empty id"));
        }
        Ok(id.to_string())
    }

    fn encode_order_value(value: &Value) -> String {
        let format = CursorFieldFormat::of(value);
        let text = match value {
            Value::Timestamp(t) => encode_millis(t),
            other => other.to_string(),
        };
        format!("{}:{text}", format.tag())
    }

    fn decode_order_value(order_part: &str) -> std::result::Result<Value, String> {
        let (tag, raw) = order_part
            .split_once(':')
            .ok_or_else(|| format!("missing type tag in '{order_part}'"))?;

        match CursorFieldFormat::from_tag(tag) {
            Some(CursorFieldFormat::String) => Ok(Value::String(raw.to_string())),
            Some(CursorFieldFormat::Number) => raw
                .parse::<Number>()
                .map(Value::Number)
                .map_err(|e| format!("invalid number '{raw}': {e}")),
            Some(CursorFieldFormat::Date) => decode_millis(raw).map(Value::Timestamp),
            Some(CursorFieldFormat::Null) if raw.is_empty() => Ok(Value::Null),
            Some(CursorFieldFormat::Null) => Err(format!("unexpected value '{raw}' for null")),
            None => Err(format!("unknown type tag '{tag}'")),
        }
    }
}

/// Epoch millis, plus up to six fraction digits when the instant is not on
/// a whole millisecond
fn encode_millis(t: &DateTime<Utc>) -> String {
    let millis = t.timestamp_millis();
    let sub_millis = t.timestamp_subsec_nanos() % 1_000_000;
    if sub_millis == 0 {
        return millis.to_string();
    }
    let fraction = format!("{sub_millis:06}");
    format!("{millis}.{}", fraction.trim_end_matches('0'))
}

fn decode_millis(raw: &str) -> std::result::Result<DateTime<Utc>, String> {
    let (whole, fraction) = raw.split_once('.').unwrap_or((raw, ""));
    let millis = whole
        .parse::<i64>()
        .map_err(|e| format!("invalid date '{raw}': {e}"))?;

    if fraction.len() > 6 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("invalid date fraction in '{raw}'"));
    }
    let nanos = if fraction.is_empty() {
        0
    } else {
        format!("{fraction:0<6}")
            .parse::<i64>()
            .map_err(|e| format!("invalid date '{raw}': {e}"))?
    };

    DateTime::from_timestamp_millis(millis)
        .and_then(|t| t.checked_add_signed(Duration::nanoseconds(nanos)))
        .ok_or_else(|| format!("date out of range: {raw}"))
}
