//! Opaque connection cursors
//!
//! A cursor records where an edge sat inside the window that produced it:
//! `base64("arrayconnection$<anchor id>$<window index>")`. Pagination is
//! recomputed from the index, the anchor id is informational.

use std::fmt;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Serialize};

use crate::error::{PaginationError, Result};

pub const SEPARATOR: char = '$';
pub const PREFIX: &str = "arrayconnection$";

/// Opaque cursor string handed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Wrap a cursor received from a client. No validation happens here.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Decode into its anchor id and window index.
    pub fn decode(&self) -> Result<CursorPosition> {
        decode_cursor(&self.0)
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Cursor {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Cursor {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<Cursor> for String {
    fn from(cursor: Cursor) -> Self {
        cursor.0
    }
}

/// Decoded cursor contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorPosition {
    pub anchor_id: String,
    pub window_index: i64,
}

impl CursorPosition {
    pub fn new(anchor_id: impl Into<String>, window_index: i64) -> Self {
        Self {
            anchor_id: anchor_id.into(),
            window_index,
        }
    }

    pub fn encode(&self) -> Cursor {
        encode_cursor(&self.anchor_id, self.window_index)
    }
}

/// Encode an anchor id and window index as a cursor
pub fn encode_cursor(anchor_id: &str, window_index: i64) -> Cursor {
    Cursor(BASE64.encode(format!("{PREFIX}{anchor_id}{SEPARATOR}{window_index}")))
}

/// Decode a cursor string back to its anchor id and window index.
///
/// The index is read after the last separator, so anchor ids may themselves
/// contain `$`.
pub fn decode_cursor(cursor: &str) -> Result<CursorPosition> {
    let bytes = BASE64
        .decode(cursor)
        .map_err(|_| PaginationError::malformed(cursor, "invalid cursor format"))?;
    let text = String::from_utf8(bytes)
        .map_err(|_| PaginationError::malformed(cursor, "invalid cursor encoding"))?;

    let body = text
        .strip_prefix(PREFIX)
        .ok_or_else(|| PaginationError::malformed(cursor, "invalid cursor prefix"))?;
    let (anchor_id, index) = body
        .rsplit_once(SEPARATOR)
        .ok_or_else(|| PaginationError::malformed(cursor, "missing cursor separator"))?;
    let window_index = index
        .parse::<i64>()
        .map_err(|_| PaginationError::malformed(cursor, "invalid cursor index"))?;

    tracing::trace!(anchor_id, window_index, "Decoded cursor");

    Ok(CursorPosition {
        anchor_id: anchor_id.to_string(),
        window_index,
    })
}
