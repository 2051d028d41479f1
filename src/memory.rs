//! In-memory connection source
//!
//! Evaluates [`FetchParams`] against a `Vec` of records. Used by the demo
//! server and tests; it also counts how often storage was touched.

use std::cmp::Ordering;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use crate::filter::WhereClause;
use crate::order::{OrderBy, OrderDirection};
use crate::source::{ConnectionSource, FetchParams, NodeLookup, Record, Target, WindowRow};

type Scope<S, N> = Arc<dyn Fn(&S, &N) -> bool + Send + Sync>;

/// A [`ConnectionSource`] over records held in memory.
pub struct MemorySource<S, N> {
    records: Vec<N>,
    /// Association predicate: does `node` belong to `parent`?
    scope: Option<Scope<S, N>>,
    fetch_calls: AtomicUsize,
    count_calls: AtomicUsize,
    last_count_filter: RwLock<Option<WhereClause>>,
}

impl<S, N> MemorySource<S, N> {
    pub fn new(records: Vec<N>) -> Self {
        Self {
            records,
            scope: None,
            fetch_calls: AtomicUsize::new(0),
            count_calls: AtomicUsize::new(0),
            last_count_filter: RwLock::new(None),
        }
    }

    /// Restrict rows to those belonging to the parent value.
    pub fn with_scope(mut self, scope: impl Fn(&S, &N) -> bool + Send + Sync + 'static) -> Self {
        self.scope = Some(Arc::new(scope));
        self
    }

    pub fn records(&self) -> &[N] {
        &self.records
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(AtomicOrdering::SeqCst)
    }

    pub fn count_calls(&self) -> usize {
        self.count_calls.load(AtomicOrdering::SeqCst)
    }

    /// Filter passed to the most recent count query.
    pub fn last_count_filter(&self) -> Option<WhereClause> {
        self.last_count_filter.read().clone()
    }
}

impl<S, N: Record> MemorySource<S, N> {
    fn matching<'a>(&'a self, source: Option<&'a S>, filter: &'a WhereClause) -> impl Iterator<Item = &'a N> {
        self.records.iter().filter(move |node| {
            let in_scope = match (&self.scope, source) {
                (Some(scope), Some(parent)) => scope(parent, *node),
                _ => true,
            };
            in_scope && matches_filter(*node, filter)
        })
    }
}

#[async_trait]
impl<S, N> ConnectionSource<S, N> for MemorySource<S, N>
where
    S: Send + Sync + 'static,
    N: Record + Clone + 'static,
{
    async fn fetch(
        &self,
        target: &Target,
        source: Option<&S>,
        params: &FetchParams,
    ) -> anyhow::Result<Vec<WindowRow<N>>> {
        self.fetch_calls.fetch_add(1, AtomicOrdering::SeqCst);

        let mut matched: Vec<&N> = self.matching(source, &params.filter).collect();
        let total = matched.len() as i64;
        matched.sort_by(|a, b| compare_nodes(*a, *b, &params.order));

        let offset = params.offset.unwrap_or(0) as usize;
        let limit = params.limit.map_or(usize::MAX, |limit| limit as usize);
        let with_count = params.window_count_alias().is_some();

        let rows: Vec<WindowRow<N>> = matched
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|node| WindowRow {
                node: node.clone(),
                full_count: with_count.then_some(total),
            })
            .collect();

        tracing::trace!(
            target_model = %target.label(),
            matched = total,
            returned = rows.len(),
            "Fetched in-memory window"
        );
        Ok(rows)
    }

    async fn count(
        &self,
        _target: &Target,
        source: Option<&S>,
        filter: &WhereClause,
    ) -> anyhow::Result<i64> {
        self.count_calls.fetch_add(1, AtomicOrdering::SeqCst);
        *self.last_count_filter.write() = Some(filter.clone());
        Ok(self.matching(source, filter).count() as i64)
    }
}

#[async_trait]
impl<S, N> NodeLookup<N> for MemorySource<S, N>
where
    S: Send + Sync + 'static,
    N: Record + Clone + 'static,
{
    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<N>> {
        Ok(self.records.iter().find(|node| node.identifier() == id).cloned())
    }
}

/// Whether a record satisfies every predicate of `filter`.
pub fn matches_filter<N: Record + ?Sized>(node: &N, filter: &WhereClause) -> bool {
    filter.iter().all(|(key, expected)| {
        let actual = node.attribute(key).unwrap_or(Value::Null);
        match expected {
            Value::Object(operators) => operators
                .iter()
                .all(|(op, operand)| apply_operator(op, &actual, operand)),
            literal => compare_values(&actual, literal) == Ordering::Equal,
        }
    })
}

fn apply_operator(op: &str, actual: &Value, operand: &Value) -> bool {
    let ordering = || compare_values(actual, operand);
    let contains = || match operand {
        Value::Array(items) => items
            .iter()
            .any(|item| compare_values(actual, item) == Ordering::Equal),
        _ => false,
    };
    match op {
        "eq" => ordering() == Ordering::Equal,
        "ne" => ordering() != Ordering::Equal,
        "gt" => ordering() == Ordering::Greater,
        "gte" => ordering() != Ordering::Less,
        "lt" => ordering() == Ordering::Less,
        "lte" => ordering() != Ordering::Greater,
        "in" => contains(),
        "notIn" => !contains(),
        _ => false,
    }
}

fn compare_nodes<N: Record + ?Sized>(a: &N, b: &N, order: &[OrderBy]) -> Ordering {
    for key in order {
        let left = a.attribute(&key.attribute).unwrap_or(Value::Null);
        let right = b.attribute(&key.attribute).unwrap_or(Value::Null);
        let ordering = match key.direction {
            OrderDirection::Asc => compare_values(&left, &right),
            OrderDirection::Desc => compare_values(&right, &left),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over JSON values: null, booleans, numbers, strings, then
/// anything else by rank only.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => {
                let (a, b) = (a.as_f64().unwrap_or(0.0), b.as_f64().unwrap_or(0.0));
                a.partial_cmp(&b).unwrap_or(Ordering::Equal)
            }
        },
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (a, b) => rank(a).cmp(&rank(b)),
    }
}
