//! Filter translation for connection arguments
//!
//! Arguments that are not part of the connection protocol (`first`, `after`,
//! ...) become predicates in a [`WhereClause`]. The translation is injected so
//! callers can give each argument its own semantics.

use serde_json::{Map, Value};

/// Accumulated filter: attribute name to either a literal (equality) or an
/// operator object such as `{"gte": 3}`.
pub type WhereClause = Map<String, Value>;

/// Names reserved by the connection protocol; never treated as filters.
pub const CONNECTION_ARGUMENTS: &[&str] = &["first", "after", "last", "before", "orderBy"];

/// Operators understood inside an operator object.
pub const OPERATORS: &[&str] = &["eq", "ne", "gt", "gte", "lt", "lte", "in", "notIn"];

/// Translates one caller argument into a filter fragment.
pub trait FilterTranslate: Send + Sync {
    /// Return the fragment to merge for `key = value`. `accumulated` holds what
    /// earlier arguments produced.
    fn translate(&self, key: &str, value: &Value, accumulated: &WhereClause) -> WhereClause;
}

impl<F> FilterTranslate for F
where
    F: Fn(&str, &Value, &WhereClause) -> WhereClause + Send + Sync,
{
    fn translate(&self, key: &str, value: &Value, accumulated: &WhereClause) -> WhereClause {
        self(key, value, accumulated)
    }
}

/// Default translation: `key = value`.
#[derive(Debug, Default, Clone, Copy)]
pub struct EqualityFilter;

impl FilterTranslate for EqualityFilter {
    fn translate(&self, key: &str, value: &Value, _accumulated: &WhereClause) -> WhereClause {
        let mut fragment = WhereClause::new();
        fragment.insert(key.to_string(), value.clone());
        fragment
    }
}

/// Build the filter for a set of caller arguments, skipping connection arguments.
pub fn args_to_where(filters: &Map<String, Value>, translate: &dyn FilterTranslate) -> WhereClause {
    let mut clause = WhereClause::new();
    for (key, value) in filters {
        if CONNECTION_ARGUMENTS.contains(&key.as_str()) {
            continue;
        }
        let fragment = translate.translate(key, value, &clause);
        clause.extend(fragment);
    }
    clause
}
