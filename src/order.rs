//! Ordering for connection windows
//!
//! An [`OrderEnum`] is the set of named orderings a connection field accepts
//! (`orderBy: [UserConnectionOrder]`). Its first value is the default.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::args::ConnectionArgs;
use crate::error::{PaginationError, Result};

/// Sort direction for a single order key.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl OrderDirection {
    pub fn reversed(self) -> Self {
        match self {
            OrderDirection::Asc => OrderDirection::Desc,
            OrderDirection::Desc => OrderDirection::Asc,
        }
    }

    /// Convert to SQL order string
    pub fn to_sql(&self) -> &'static str {
        match self {
            OrderDirection::Asc => "ASC",
            OrderDirection::Desc => "DESC",
        }
    }
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_sql())
    }
}

impl std::str::FromStr for OrderDirection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_uppercase().as_str() {
            "ASC" => Ok(OrderDirection::Asc),
            "DESC" => Ok(OrderDirection::Desc),
            _ => Err(anyhow::anyhow!("Unknown order direction: {}", s)),
        }
    }
}

/// One `(attribute, direction)` pair of an order specification.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct OrderBy {
    pub attribute: String,
    pub direction: OrderDirection,
}

impl OrderBy {
    pub fn new(attribute: impl Into<String>, direction: OrderDirection) -> Self {
        Self {
            attribute: attribute.into(),
            direction,
        }
    }

    pub fn asc(attribute: impl Into<String>) -> Self {
        Self::new(attribute, OrderDirection::Asc)
    }

    pub fn desc(attribute: impl Into<String>) -> Self {
        Self::new(attribute, OrderDirection::Desc)
    }

    pub fn reversed(&self) -> Self {
        Self::new(self.attribute.clone(), self.direction.reversed())
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.attribute, self.direction)
    }
}

/// An `orderBy` argument as supplied by the caller.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum OrderArg {
    /// Key of the connection's order enum, e.g. `NAME`.
    Named(String),
    /// An explicit pair, bypassing the enum.
    Explicit(OrderBy),
}

impl From<OrderBy> for OrderArg {
    fn from(order: OrderBy) -> Self {
        OrderArg::Explicit(order)
    }
}

impl From<&str> for OrderArg {
    fn from(name: &str) -> Self {
        OrderArg::Named(name.to_string())
    }
}

/// Attribute name derived from the arguments of the request being shaped.
pub type ComputedAttribute = Arc<dyn Fn(&ConnectionArgs) -> String + Send + Sync>;

/// What an order enum key sorts by.
#[derive(Clone)]
pub enum OrderValue {
    Fixed(OrderBy),
    /// The attribute is picked per request, e.g. a locale specific column.
    Computed {
        attribute: ComputedAttribute,
        direction: OrderDirection,
    },
}

impl OrderValue {
    pub fn to_order(&self, args: &ConnectionArgs) -> OrderBy {
        match self {
            OrderValue::Fixed(order) => order.clone(),
            OrderValue::Computed {
                attribute,
                direction,
            } => OrderBy::new(attribute(args), *direction),
        }
    }
}

impl fmt::Debug for OrderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderValue::Fixed(order) => f.debug_tuple("Fixed").field(order).finish(),
            OrderValue::Computed { direction, .. } => f
                .debug_struct("Computed")
                .field("direction", direction)
                .finish_non_exhaustive(),
        }
    }
}

impl fmt::Display for OrderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderValue::Fixed(order) => fmt::Display::fmt(order, f),
            OrderValue::Computed { direction, .. } => write!(f, "(computed) {}", direction),
        }
    }
}

impl From<OrderBy> for OrderValue {
    fn from(order: OrderBy) -> Self {
        OrderValue::Fixed(order)
    }
}

/// A named enumeration of orderings.
#[derive(Clone, Debug)]
pub struct OrderEnum {
    name: String,
    values: Vec<(String, OrderValue)>,
}

impl OrderEnum {
    /// Create an enum with its default (first) value.
    pub fn new(name: impl Into<String>, key: impl Into<String>, order: OrderBy) -> Self {
        Self {
            name: name.into(),
            values: vec![(key.into(), order.into())],
        }
    }

    /// The enum used when a connection declares none: `ID` sorts by the
    /// primary key ascending.
    pub fn primary_key(connection_name: &str, primary_key: &str) -> Self {
        Self::new(
            format!("{connection_name}ConnectionOrder"),
            "ID",
            OrderBy::asc(primary_key),
        )
    }

    pub fn value(self, key: impl Into<String>, order: OrderBy) -> Self {
        self.insert(key.into(), order.into())
    }

    /// Add a key whose attribute is computed from the request arguments.
    pub fn computed<F>(self, key: impl Into<String>, direction: OrderDirection, attribute: F) -> Self
    where
        F: Fn(&ConnectionArgs) -> String + Send + Sync + 'static,
    {
        self.insert(
            key.into(),
            OrderValue::Computed {
                attribute: Arc::new(attribute),
                direction,
            },
        )
    }

    fn insert(mut self, key: String, value: OrderValue) -> Self {
        match self.values.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value,
            None => self.values.push((key, value)),
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> impl Iterator<Item = (&str, &OrderValue)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn default_order(&self) -> &OrderValue {
        &self.values[0].1
    }

    pub fn lookup(&self, key: &str) -> Result<&OrderValue> {
        self.values
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
            .ok_or_else(|| PaginationError::UnknownOrder {
                key: key.to_string(),
                enum_name: self.name.clone(),
            })
    }

    /// Resolve the `orderBy` of `args`; an empty or missing list yields the
    /// default.
    pub fn resolve(&self, args: &ConnectionArgs) -> Result<Vec<OrderBy>> {
        match args.order_by.as_deref() {
            None | Some([]) => Ok(vec![self.default_order().to_order(args)]),
            Some(order_by) => order_by
                .iter()
                .map(|arg| match arg {
                    OrderArg::Named(key) => Ok(self.lookup(key)?.to_order(args)),
                    OrderArg::Explicit(order) => Ok(order.clone()),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn user_order() -> OrderEnum {
        OrderEnum::new("UserConnectionOrder", "ID", OrderBy::asc("id"))
            .value("NAME", OrderBy::asc("name"))
            .value("NEWEST", OrderBy::desc("created_at"))
    }

    #[test]
    fn test_default_is_first_value() {
        let order = user_order();
        assert_eq!(order.resolve(&ConnectionArgs::default()).unwrap(), vec![OrderBy::asc("id")]);
        let empty = ConnectionArgs {
            order_by: Some(Vec::new()),
            ..Default::default()
        };
        assert_eq!(order.resolve(&empty).unwrap(), vec![OrderBy::asc("id")]);
    }

    #[test]
    fn test_named_and_explicit_values() {
        let order = user_order();
        let args = ConnectionArgs::first(2)
            .order_by("NEWEST")
            .order_by(OrderBy::asc("email"));
        let resolved = order.resolve(&args).unwrap();
        assert_eq!(resolved, vec![OrderBy::desc("created_at"), OrderBy::asc("email")]);
    }

    #[test]
    fn test_computed_value_reads_arguments() {
        let order = user_order().computed("LOCAL_NAME", OrderDirection::Asc, |args| {
            match args.filters.get("locale").and_then(|locale| locale.as_str()) {
                Some(locale) => format!("name_{locale}"),
                None => "name".to_string(),
            }
        });
        let args = ConnectionArgs::first(1).order_by("LOCAL_NAME").filter("locale", "fr");
        assert_eq!(order.resolve(&args).unwrap(), vec![OrderBy::asc("name_fr")]);
        let args = ConnectionArgs::first(1).order_by("LOCAL_NAME");
        assert_eq!(order.resolve(&args).unwrap(), vec![OrderBy::asc("name")]);
        assert_eq!(order.lookup("LOCAL_NAME").unwrap().to_string(), "(computed) ASC");
    }

    #[test]
    fn test_unknown_key() {
        let order = user_order();
        assert_matches!(
            order.resolve(&ConnectionArgs::first(1).order_by("OLDEST")),
            Err(PaginationError::UnknownOrder { key, .. }) if key == "OLDEST"
        );
    }

    #[test]
    fn test_primary_key_enum() {
        let order = OrderEnum::primary_key("Task", "id");
        assert_eq!(order.name(), "TaskConnectionOrder");
        assert_eq!(order.values().map(|(k, _)| k).collect::<Vec<_>>(), vec!["ID"]);
    }

    #[test]
    fn test_direction_parsing() {
        assert_eq!("desc".parse::<OrderDirection>().unwrap(), OrderDirection::Desc);
        assert!("sideways".parse::<OrderDirection>().is_err());
    }
}
