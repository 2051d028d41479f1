//! Connection arguments on dynamic fields
//! See: https://relay.dev/graphql/connections.htm#sec-Arguments

use async_graphql::dynamic::{Field, InputValue, ObjectAccessor, TypeRef};

use crate::args::ConnectionArgs;
use crate::cursor::Cursor;
use crate::order::{OrderArg, OrderEnum};

/// Add `first`, `after`, `last`, `before`, `orderBy` and the given filter
/// arguments to a field.
pub fn connection_arguments(
    field: Field,
    order_enum: &OrderEnum,
    filters: impl IntoIterator<Item = InputValue>,
) -> Field {
    let field = field
        .argument(
            InputValue::new("first", TypeRef::named(TypeRef::INT))
                .description("Paginate forward, returning the given amount of edges at most."),
        )
        .argument(
            InputValue::new("after", TypeRef::named(TypeRef::STRING))
                .description("Return edges after the given cursor."),
        )
        .argument(
            InputValue::new("last", TypeRef::named(TypeRef::INT))
                .description("Paginate backward, returning the given amount of edges at most."),
        )
        .argument(
            InputValue::new("before", TypeRef::named(TypeRef::STRING))
                .description("Return edges before the given cursor."),
        )
        .argument(
            InputValue::new("orderBy", TypeRef::named_nn_list(order_enum.name()))
                .description("Order of the edges; the first key is applied first."),
        );
    filters
        .into_iter()
        .fold(field, |field, argument| field.argument(argument))
}

/// Read connection arguments from a resolver context. Explicit nulls count as
/// absent; every argument besides the connection ones becomes a filter.
pub fn parse_connection_args(args: &ObjectAccessor<'_>) -> async_graphql::Result<ConnectionArgs> {
    let mut parsed = ConnectionArgs::default();
    for (name, value) in args.iter() {
        if value.is_null() {
            continue;
        }
        match name.as_str() {
            "first" => parsed.first = Some(value.i64()?),
            "last" => parsed.last = Some(value.i64()?),
            "after" => parsed.after = Some(Cursor::new(value.string()?)),
            "before" => parsed.before = Some(Cursor::new(value.string()?)),
            "orderBy" => {
                let keys = value
                    .list()?
                    .iter()
                    .map(|item| item.enum_name().map(|key| OrderArg::Named(key.to_string())))
                    .collect::<async_graphql::Result<Vec<_>>>()?;
                parsed.order_by = Some(keys);
            }
            other => {
                parsed
                    .filters
                    .insert(other.to_string(), value.as_value().clone().into_json()?);
            }
        }
    }
    Ok(parsed)
}
