//! Connection, edge, PageInfo and order enum type definitions
//! See: https://relay.dev/graphql/connections.htm#sec-Connection-Types

use std::collections::HashSet;
use std::marker::PhantomData;

use async_graphql::dynamic::{
    Enum, EnumItem, Field, FieldFuture, FieldValue, Object, SchemaBuilder, Type, TypeRef,
};

use crate::connection::{ConnectionOutput, Edge, PageInfo};
use crate::order::OrderEnum;

pub const PAGE_INFO: &str = "PageInfo";

pub fn connection_type_name(name: &str) -> String {
    format!("{}Connection", name)
}

pub fn edge_type_name(name: &str) -> String {
    format!("{}Edge", name)
}

/// Names already registered with a schema under construction.
///
/// Create one per schema build and pass it to every definition helper;
/// `PageInfo` and order enums shared by several connections are then
/// registered only once. Drop it together with the builder.
#[derive(Debug, Default)]
pub struct TypeCache {
    registered: HashSet<String>,
}

impl TypeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.registered.contains(name)
    }

    /// Register `ty` under `name` unless a type of that name was registered
    /// through this cache before.
    pub fn register(
        &mut self,
        builder: SchemaBuilder,
        name: &str,
        ty: impl Into<Type>,
    ) -> SchemaBuilder {
        if self.registered.insert(name.to_string()) {
            tracing::trace!(type_name = name, "Registering GraphQL type");
            builder.register(ty)
        } else {
            builder
        }
    }
}

fn page_info_object() -> Object {
    Object::new(PAGE_INFO)
        .description("Information about pagination in a connection")
        .field(Field::new(
            "hasNextPage",
            TypeRef::named_nn(TypeRef::BOOLEAN),
            |ctx| {
                FieldFuture::new(async move {
                    let info = ctx.parent_value.try_downcast_ref::<PageInfo>()?;
                    Ok(Some(FieldValue::value(info.has_next_page)))
                })
            },
        ))
        .field(Field::new(
            "hasPreviousPage",
            TypeRef::named_nn(TypeRef::BOOLEAN),
            |ctx| {
                FieldFuture::new(async move {
                    let info = ctx.parent_value.try_downcast_ref::<PageInfo>()?;
                    Ok(Some(FieldValue::value(info.has_previous_page)))
                })
            },
        ))
        .field(Field::new(
            "startCursor",
            TypeRef::named(TypeRef::STRING),
            |ctx| {
                FieldFuture::new(async move {
                    let info = ctx.parent_value.try_downcast_ref::<PageInfo>()?;
                    Ok(info
                        .start_cursor
                        .as_ref()
                        .map(|cursor| FieldValue::value(cursor.to_string())))
                })
            },
        ))
        .field(Field::new(
            "endCursor",
            TypeRef::named(TypeRef::STRING),
            |ctx| {
                FieldFuture::new(async move {
                    let info = ctx.parent_value.try_downcast_ref::<PageInfo>()?;
                    Ok(info
                        .end_cursor
                        .as_ref()
                        .map(|cursor| FieldValue::value(cursor.to_string())))
                })
            },
        ))
}

fn order_enum_type(order_enum: &OrderEnum) -> Enum {
    order_enum
        .values()
        .fold(Enum::new(order_enum.name()), |ty, (key, order)| {
            ty.item(EnumItem::new(key).description(order.to_string()))
        })
}

/// Types backing one connection field.
///
/// The connection object resolves from a [`ConnectionOutput<N, S>`] and the
/// edge object from an [`Edge<N>`]; extra fields added with
/// [`connection_field`](Self::connection_field) and
/// [`edge_field`](Self::edge_field) receive the same parent values. The node
/// type itself must be registered by the caller and resolve from `N`.
pub struct ConnectionDefinitions<N, S> {
    name: String,
    node_type: String,
    order_enum: OrderEnum,
    connection_fields: Vec<Field>,
    edge_fields: Vec<Field>,
    _marker: PhantomData<fn() -> (N, S)>,
}

/// Start defining `<name>Connection`, `<name>Edge` and their order enum.
pub fn connection_definitions<N, S>(
    name: impl Into<String>,
    node_type: impl Into<String>,
    order_enum: OrderEnum,
) -> ConnectionDefinitions<N, S> {
    ConnectionDefinitions {
        name: name.into(),
        node_type: node_type.into(),
        order_enum,
        connection_fields: Vec::new(),
        edge_fields: Vec::new(),
        _marker: PhantomData,
    }
}

impl<N, S> ConnectionDefinitions<N, S>
where
    N: Send + Sync + 'static,
    S: Send + Sync + 'static,
{
    pub fn connection_field(mut self, field: Field) -> Self {
        self.connection_fields.push(field);
        self
    }

    pub fn edge_field(mut self, field: Field) -> Self {
        self.edge_fields.push(field);
        self
    }

    pub fn connection_type(&self) -> String {
        connection_type_name(&self.name)
    }

    pub fn edge_type(&self) -> String {
        edge_type_name(&self.name)
    }

    pub fn order_enum(&self) -> &OrderEnum {
        &self.order_enum
    }

    fn edge_object(&self, extra: Vec<Field>) -> Object {
        let edge = Object::new(self.edge_type())
            .description("An edge in a connection, containing a node and cursor")
            .field(Field::new(
                "cursor",
                TypeRef::named_nn(TypeRef::STRING),
                |ctx| {
                    FieldFuture::new(async move {
                        let edge = ctx.parent_value.try_downcast_ref::<Edge<N>>()?;
                        Ok(Some(FieldValue::value(edge.cursor.to_string())))
                    })
                },
            ))
            .field(Field::new(
                "node",
                TypeRef::named_nn(self.node_type.as_str()),
                |ctx| {
                    FieldFuture::new(async move {
                        let edge = ctx.parent_value.try_downcast_ref::<Edge<N>>()?;
                        Ok(Some(FieldValue::borrowed_any(&edge.node)))
                    })
                },
            ));
        extra.into_iter().fold(edge, |object, field| object.field(field))
    }

    fn connection_object(&self, extra: Vec<Field>) -> Object {
        let connection = Object::new(self.connection_type())
            .field(Field::new(
                "edges",
                TypeRef::named_nn_list_nn(self.edge_type()),
                |ctx| {
                    FieldFuture::new(async move {
                        let output = ctx
                            .parent_value
                            .try_downcast_ref::<ConnectionOutput<N, S>>()?;
                        Ok(output.connection().map(|connection| {
                            FieldValue::list(
                                connection
                                    .edges
                                    .iter()
                                    .map(|edge| FieldValue::borrowed_any(edge)),
                            )
                        }))
                    })
                },
            ))
            .field(Field::new(
                "pageInfo",
                TypeRef::named_nn(PAGE_INFO),
                |ctx| {
                    FieldFuture::new(async move {
                        let output = ctx
                            .parent_value
                            .try_downcast_ref::<ConnectionOutput<N, S>>()?;
                        Ok(output
                            .connection()
                            .map(|connection| FieldValue::borrowed_any(&connection.page_info)))
                    })
                },
            ))
            .field(Field::new(
                "fullCount",
                TypeRef::named_nn(TypeRef::INT),
                |ctx| {
                    FieldFuture::new(async move {
                        let output = ctx
                            .parent_value
                            .try_downcast_ref::<ConnectionOutput<N, S>>()?;
                        Ok(output
                            .connection()
                            .map(|connection| FieldValue::value(connection.full_count)))
                    })
                },
            ));
        extra
            .into_iter()
            .fold(connection, |object, field| object.field(field))
    }

    /// Register PageInfo, the order enum, the edge and the connection types.
    pub fn register(mut self, cache: &mut TypeCache, builder: SchemaBuilder) -> SchemaBuilder {
        let edge_fields = std::mem::take(&mut self.edge_fields);
        let connection_fields = std::mem::take(&mut self.connection_fields);
        let builder = cache.register(builder, PAGE_INFO, page_info_object());
        let builder = cache.register(
            builder,
            self.order_enum.name(),
            order_enum_type(&self.order_enum),
        );
        let builder = cache.register(builder, &self.edge_type(), self.edge_object(edge_fields));
        cache.register(
            builder,
            &self.connection_type(),
            self.connection_object(connection_fields),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        assert_eq!(connection_type_name("UserTasks"), "UserTasksConnection");
        assert_eq!(edge_type_name("UserTasks"), "UserTasksEdge");
    }

    #[test]
    fn test_type_cache_registers_once() {
        let mut cache = TypeCache::new();
        let builder = async_graphql::dynamic::Schema::build("Query", None, None);
        let builder = cache.register(builder, PAGE_INFO, page_info_object());
        let _builder = cache.register(builder, PAGE_INFO, page_info_object());
        assert!(cache.contains(PAGE_INFO));
        assert!(!cache.contains("UserConnection"));
    }
}
