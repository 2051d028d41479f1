//! Simplified view of a GraphQL selection
//!
//! Flattens fragments, keys fields by their response name (alias or name),
//! merges repeated selections and keeps argument values as JSON.

use std::collections::BTreeMap;

use async_graphql::context::SelectionField;
use serde_json::{Map, Value};

/// One field of a selection tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimplifiedField {
    /// Schema field name; differs from the map key when aliased.
    pub name: String,
    pub args: Map<String, Value>,
    /// Sub-selection keyed by response name.
    pub fields: BTreeMap<String, SimplifiedField>,
}

impl SimplifiedField {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add a child selection under its own name.
    pub fn with_field(mut self, field: SimplifiedField) -> Self {
        let key = field.name.clone();
        self.insert(key, field);
        self
    }

    pub fn with_arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(name.into(), value.into());
        self
    }

    /// Simplify an executing field's selection.
    pub fn from_selection(field: SelectionField<'_>) -> async_graphql::Result<Self> {
        let mut args = Map::new();
        for (name, value) in field.arguments()? {
            args.insert(name.to_string(), value.into_json()?);
        }

        let mut simplified = Self {
            name: field.name().to_string(),
            args,
            fields: BTreeMap::new(),
        };
        for child in field.selection_set() {
            let key = child.alias().unwrap_or(child.name()).to_string();
            let child = Self::from_selection(child)?;
            simplified.insert(key, child);
        }
        Ok(simplified)
    }

    fn insert(&mut self, key: String, field: SimplifiedField) {
        match self.fields.get_mut(&key) {
            Some(existing) => existing.merge(field),
            None => {
                self.fields.insert(key, field);
            }
        }
    }

    fn merge(&mut self, other: SimplifiedField) {
        if !other.args.is_empty() {
            self.args = other.args;
        }
        for (key, field) in other.fields {
            self.insert(key, field);
        }
    }

    /// Whether any direct child selects the schema field `name`, aliased or not.
    pub fn selects(&self, name: &str) -> bool {
        self.fields.values().any(|field| field.name == name)
    }

    /// Whether any of `names` is selected.
    pub fn selects_any(&self, names: &[&str]) -> bool {
        names.iter().any(|name| self.selects(name))
    }

    pub fn field(&self, key: &str) -> Option<&SimplifiedField> {
        self.fields.get(key)
    }
}
