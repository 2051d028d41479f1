//! Data access seam
//!
//! The resolver never queries storage itself. It shapes [`FetchParams`] and
//! hands them to a [`ConnectionSource`], which knows how to run them against
//! an ORM, a database or anything else.

use async_trait::async_trait;
use serde_json::Value;

use crate::filter::WhereClause;
use crate::order::OrderBy;

/// A fetched entity.
pub trait Record: Send + Sync {
    /// Unique identifier, used as the cursor anchor.
    fn identifier(&self) -> String;

    /// Value of an attribute, if the entity has one with this name.
    fn attribute(&self, name: &str) -> Option<Value>;
}

/// One row of a fetched window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowRow<N> {
    pub node: N,
    /// Total match count computed alongside the window (e.g. `COUNT(*) OVER()`).
    pub full_count: Option<i64>,
}

impl<N> WindowRow<N> {
    pub fn new(node: N) -> Self {
        Self {
            node,
            full_count: None,
        }
    }

    pub fn with_full_count(node: N, full_count: i64) -> Self {
        Self {
            node,
            full_count: Some(full_count),
        }
    }
}

impl<N> From<N> for WindowRow<N> {
    fn from(node: N) -> Self {
        Self::new(node)
    }
}

/// What a connection field reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetKind {
    /// A whole model (`Query.users`); the parent value is ignored.
    Model,
    /// An association of the parent (`User.tasks`); the parent is passed to
    /// every fetch and count.
    Association { name: String },
}

/// Model metadata for a connection target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub kind: TargetKind,
    /// Model name, e.g. `Task`.
    pub model: String,
    /// Primary key attribute, e.g. `id`.
    pub primary_key: String,
    /// Attributes selected by default.
    pub attributes: Vec<String>,
}

impl Target {
    pub fn model(model: impl Into<String>, primary_key: impl Into<String>) -> Self {
        Self {
            kind: TargetKind::Model,
            model: model.into(),
            primary_key: primary_key.into(),
            attributes: Vec::new(),
        }
    }

    pub fn association(
        name: impl Into<String>,
        model: impl Into<String>,
        primary_key: impl Into<String>,
    ) -> Self {
        Self {
            kind: TargetKind::Association { name: name.into() },
            model: model.into(),
            primary_key: primary_key.into(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attributes<I, A>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_association(&self) -> bool {
        matches!(self.kind, TargetKind::Association { .. })
    }

    /// Name used in logs: `Task`, or `tasks(Task)` for an association.
    pub fn label(&self) -> String {
        match &self.kind {
            TargetKind::Model => self.model.clone(),
            TargetKind::Association { name } => format!("{}({})", name, self.model),
        }
    }
}

/// An attribute requested from storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Attribute {
    Column(String),
    /// A computed expression selected under an alias.
    Computed { expression: String, alias: String },
    /// Total match count computed alongside the window, e.g.
    /// `COUNT(*) OVER()`. Storage copies it into [`WindowRow::full_count`].
    WindowCount { expression: String, alias: String },
}

impl Attribute {
    pub fn column(name: impl Into<String>) -> Self {
        Attribute::Column(name.into())
    }

    pub fn name(&self) -> &str {
        match self {
            Attribute::Column(name) => name,
            Attribute::Computed { alias, .. } | Attribute::WindowCount { alias, .. } => alias,
        }
    }
}

/// Window parameters handed to [`ConnectionSource::fetch`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchParams {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub order: Vec<OrderBy>,
    pub attributes: Vec<Attribute>,
    pub filter: WhereClause,
}

impl FetchParams {
    /// The alias under which a windowed total count was requested, if any.
    pub fn window_count_alias(&self) -> Option<&str> {
        self.attributes.iter().find_map(|attribute| match attribute {
            Attribute::WindowCount { alias, .. } => Some(alias.as_str()),
            _ => None,
        })
    }
}

/// Fetch and count capabilities for one connection target.
///
/// `source` is the parent value for association targets and `None` for model
/// targets. Errors are reported to the GraphQL caller unchanged.
#[async_trait]
pub trait ConnectionSource<S, N>: Send + Sync
where
    S: Send + Sync,
{
    /// Fetch an ordered window of rows.
    async fn fetch(
        &self,
        target: &Target,
        source: Option<&S>,
        params: &FetchParams,
    ) -> anyhow::Result<Vec<WindowRow<N>>>;

    /// Count every row matching `filter`, ignoring limit and offset.
    async fn count(
        &self,
        target: &Target,
        source: Option<&S>,
        filter: &WhereClause,
    ) -> anyhow::Result<i64>;
}

/// Single entity lookup by identifier, backing `node(id:)`.
#[async_trait]
pub trait NodeLookup<N>: Send + Sync {
    async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<N>>;
}
