//! Connection fields backed by a [`ConnectionResolver`]

use std::sync::Arc;

use async_graphql::ErrorExtensions;
use async_graphql::dynamic::{Field, FieldFuture, FieldValue, InputValue, TypeRef};

use super::args::{connection_arguments, parse_connection_args};
use super::types::connection_type_name;
use crate::resolver::ConnectionResolver;
use crate::selection::SimplifiedField;
use crate::source::Record;

/// A field resolving to `<connection>Connection`, with connection and filter
/// arguments attached.
///
/// For association targets the parent value must be an `S`. Model targets
/// accept any parent; it is only kept on the descriptor when it is an `S`.
pub fn connection_field<S, N>(
    name: &str,
    connection: &str,
    resolver: Arc<ConnectionResolver<S, N>>,
    filters: impl IntoIterator<Item = InputValue>,
) -> Field
where
    S: Clone + Send + Sync + 'static,
    N: Record + 'static,
{
    let order_enum = resolver.order_enum().clone();
    let field = Field::new(
        name,
        TypeRef::named_nn(connection_type_name(connection)),
        move |ctx| {
            let resolver = resolver.clone();
            FieldFuture::new(async move {
                let source = if resolver.target().is_association() {
                    Some(ctx.parent_value.try_downcast_ref::<S>()?)
                } else {
                    ctx.parent_value.downcast_ref::<S>()
                };
                let args = parse_connection_args(&ctx.args)?;
                let selection = SimplifiedField::from_selection(ctx.field())?;

                let output = resolver
                    .resolve(source, args, &selection)
                    .await
                    .map_err(|err| {
                        tracing::debug!(error = %err, code = err.code(), "Connection resolution failed");
                        err.extend()
                    })?;
                Ok(Some(FieldValue::owned_any(output)))
            })
        },
    );
    connection_arguments(field, &order_enum, filters)
}
