//! Connection arguments
//!
//! Forward pagination uses `first`/`after`, backward pagination `last`/`before`.

use serde_json::{Map, Value};

use crate::cursor::{Cursor, CursorPosition};
use crate::error::{PaginationError, Result};
use crate::order::OrderArg;

/// Arguments of a connection field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionArgs {
    /// Number of edges to return from the start of the window.
    pub first: Option<i64>,
    /// Number of edges to return from the end of the window.
    pub last: Option<i64>,
    /// Return edges before this cursor.
    pub before: Option<Cursor>,
    /// Return edges after this cursor.
    pub after: Option<Cursor>,
    pub order_by: Option<Vec<OrderArg>>,
    /// Every other argument; translated into filter predicates.
    pub filters: Map<String, Value>,
}

/// Which end of the ordering a bounded request counts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDirection {
    Forward,
    Backward,
}

impl ConnectionArgs {
    pub fn first(count: i64) -> Self {
        Self {
            first: Some(count),
            ..Default::default()
        }
    }

    pub fn last(count: i64) -> Self {
        Self {
            last: Some(count),
            ..Default::default()
        }
    }

    pub fn after(mut self, cursor: impl Into<Cursor>) -> Self {
        self.after = Some(cursor.into());
        self
    }

    pub fn before(mut self, cursor: impl Into<Cursor>) -> Self {
        self.before = Some(cursor.into());
        self
    }

    pub fn order_by(mut self, order: impl Into<OrderArg>) -> Self {
        self.order_by.get_or_insert_with(Vec::new).push(order.into());
        self
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    /// Reject combinations the window computation cannot honour.
    ///
    /// With `strict` unset, `first` and `last` may be combined and `first` wins.
    pub fn validate(&self, strict: bool) -> Result<()> {
        if strict && self.first.is_some() && self.last.is_some() {
            return Err(PaginationError::InvalidArguments(
                "`first` and `last` cannot be combined".to_string(),
            ));
        }
        if self.before.is_some() && self.after.is_some() {
            return Err(PaginationError::InvalidArguments(
                "`before` and `after` cannot be combined".to_string(),
            ));
        }
        for (name, value) in [("first", self.first), ("last", self.last)] {
            if value.is_some_and(|count| count < 0) {
                return Err(PaginationError::InvalidArguments(format!(
                    "`{name}` must not be negative"
                )));
            }
        }
        Ok(())
    }

    /// Requested page size, `first` taking precedence.
    ///
    /// `Some(0)` is a real bound: the page is empty and carries no page flags.
    pub fn page_size(&self) -> Option<i64> {
        self.first.or(self.last)
    }

    /// Backward only when `last` is the bound in effect.
    pub fn direction(&self) -> PageDirection {
        if self.first.is_none() && self.last.is_some() {
            PageDirection::Backward
        } else {
            PageDirection::Forward
        }
    }

    pub fn anchor_cursor(&self) -> Option<&Cursor> {
        self.after.as_ref().or(self.before.as_ref())
    }

    pub fn decode_anchor(&self) -> Result<Option<CursorPosition>> {
        self.anchor_cursor().map(Cursor::decode).transpose()
    }
}
