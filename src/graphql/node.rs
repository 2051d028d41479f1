//! Relay node interface
//! See: https://graphql.org/learn/global-object-identification/#node-interface

use std::collections::HashMap;
use std::sync::Arc;

use async_graphql::dynamic::{
    Field, FieldFuture, FieldValue, InputValue, Interface, InterfaceField, Object, SchemaBuilder,
    TypeRef,
};
use async_trait::async_trait;

use super::types::TypeCache;
use crate::global_id::{from_global_id, to_global_id};
use crate::source::{NodeLookup, Record};

pub const NODE: &str = "Node";

#[async_trait]
trait ResolveNode: Send + Sync {
    async fn resolve(&self, id: &str) -> anyhow::Result<Option<FieldValue<'static>>>;
}

struct TypedLookup<N>(Arc<dyn NodeLookup<N>>);

#[async_trait]
impl<N> ResolveNode for TypedLookup<N>
where
    N: Send + Sync + 'static,
{
    async fn resolve(&self, id: &str) -> anyhow::Result<Option<FieldValue<'static>>> {
        Ok(self.0.find_by_id(id).await?.map(FieldValue::owned_any))
    }
}

/// GraphQL type names and the lookups that load their nodes.
#[derive(Clone, Default)]
pub struct NodeTypeMapper {
    types: HashMap<String, Arc<dyn ResolveNode>>,
}

impl NodeTypeMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve global ids of `type_name` through `lookup`. The object type
    /// registered under that name must resolve its fields from an `N`.
    pub fn map_type<N>(mut self, type_name: &str, lookup: Arc<dyn NodeLookup<N>>) -> Self
    where
        N: Send + Sync + 'static,
    {
        self.types
            .insert(type_name.to_string(), Arc::new(TypedLookup(lookup)));
        self
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Load the node behind a global id, tagged with its object type.
    ///
    /// Ids of unmapped types and unknown ids resolve to `None`; ids that are
    /// not valid global ids are errors.
    pub async fn fetch(&self, global_id: &str) -> anyhow::Result<Option<FieldValue<'static>>> {
        let (type_name, id) = from_global_id(global_id)?;
        let Some(lookup) = self.types.get(&type_name) else {
            tracing::debug!(type_name = %type_name, "No node type mapped for global id");
            return Ok(None);
        };
        let node = lookup.resolve(&id).await?;
        Ok(node.map(|value| value.with_type(type_name)))
    }
}

/// `interface Node { id: ID! }`
pub fn node_interface() -> Interface {
    Interface::new(NODE)
        .description("An object with a global id")
        .field(InterfaceField::new("id", TypeRef::named_nn(TypeRef::ID)))
}

/// Register the `Node` interface unless this schema build already has it.
pub fn register_node_interface(cache: &mut TypeCache, builder: SchemaBuilder) -> SchemaBuilder {
    cache.register(builder, NODE, node_interface())
}

/// The `id` field of a node object, resolving to `base64("<type_name>:<identifier>")`.
pub fn node_id_field<N: Record + 'static>(type_name: &str) -> Field {
    let type_name = type_name.to_string();
    Field::new("id", TypeRef::named_nn(TypeRef::ID), move |ctx| {
        let type_name = type_name.clone();
        FieldFuture::new(async move {
            let node = ctx.parent_value.try_downcast_ref::<N>()?;
            Ok(Some(FieldValue::value(to_global_id(
                &type_name,
                &node.identifier(),
            ))))
        })
    })
}

/// An object type implementing `Node`, resolving from `N`.
pub fn node_object<N: Record + 'static>(type_name: &str) -> Object {
    Object::new(type_name)
        .implement(NODE)
        .field(node_id_field::<N>(type_name))
}

/// Root field `node(id: ID!): Node`.
/// See: https://graphql.org/learn/global-object-identification/#node-root-field
pub fn node_field(mapper: Arc<NodeTypeMapper>) -> Field {
    Field::new("node", TypeRef::named(NODE), move |ctx| {
        let mapper = mapper.clone();
        FieldFuture::new(async move {
            let id = ctx.args.try_get("id")?;
            let node = mapper.fetch(id.string()?).await?;
            Ok(node)
        })
    })
    .argument(InputValue::new("id", TypeRef::named_nn(TypeRef::ID)).description("ID of the node."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySource;
    use serde_json::{Value, json};

    #[derive(Debug, Clone, PartialEq)]
    struct Invoice(i64);

    impl Record for Invoice {
        fn identifier(&self) -> String {
            self.0.to_string()
        }

        fn attribute(&self, name: &str) -> Option<Value> {
            (name == "id").then(|| json!(self.0))
        }
    }

    fn mapper() -> NodeTypeMapper {
        let invoices: Arc<MemorySource<(), Invoice>> =
            Arc::new(MemorySource::new(vec![Invoice(1), Invoice(2)]));
        NodeTypeMapper::new().map_type::<Invoice>("Invoice", invoices)
    }

    #[test]
    fn test_mapped_types() {
        let mapper = mapper();
        assert!(mapper.contains("Invoice"));
        assert!(!mapper.contains("User"));
        assert_eq!(mapper.type_names().collect::<Vec<_>>(), vec!["Invoice"]);
    }

    #[tokio::test]
    async fn test_fetch_resolves_mapped_ids() {
        let mapper = mapper();
        assert!(mapper.fetch(&to_global_id("Invoice", "2")).await.unwrap().is_some());
        assert!(mapper.fetch(&to_global_id("Invoice", "9")).await.unwrap().is_none());
        assert!(mapper.fetch(&to_global_id("User", "1")).await.unwrap().is_none());
        assert!(mapper.fetch("not a global id").await.is_err());
    }
}
