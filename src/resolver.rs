//! Connection resolver
//!
//! Per request: check the selection, then either return a descriptor without
//! touching storage, or shape the window, fetch it, reconcile the total count
//! and build the page.
//!
//! The count query, when needed, always runs after the window fetch: it is
//! only issued once the fetch has shown that storage supplied no windowed
//! count for a non-empty window.

use std::sync::Arc;

use async_trait::async_trait;

use crate::args::ConnectionArgs;
use crate::config::ConnectionConfig;
use crate::connection::{
    Connection, ConnectionDescriptor, ConnectionOutput, auxiliary_count, build_edges, page_info,
};
use crate::error::{PaginationError, Result};
use crate::filter::{EqualityFilter, FilterTranslate, args_to_where};
use crate::order::OrderEnum;
use crate::plan::{ShapeContext, shape_window};
use crate::selection::SimplifiedField;
use crate::source::{ConnectionSource, FetchParams, Record, Target};

/// Sub-fields whose presence means the caller wants fetched data.
pub const CONNECTION_FIELDS: &[&str] = &["edges", "pageInfo", "fullCount"];

/// Optional customisation around the fetch.
#[async_trait]
pub trait ConnectionHooks<S, N>: Send + Sync
where
    S: Send + Sync + 'static,
    N: Send + Sync + 'static,
{
    /// Adjust the shaped fetch parameters. The returned filter is also the
    /// one used for the fallback count.
    async fn before_fetch(
        &self,
        params: FetchParams,
        _args: &ConnectionArgs,
    ) -> anyhow::Result<FetchParams> {
        Ok(params)
    }

    /// Post-process the finished page.
    async fn after_resolve(&self, connection: Connection<N, S>) -> anyhow::Result<Connection<N, S>> {
        Ok(connection)
    }
}

/// Hooks that change nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl<S, N> ConnectionHooks<S, N> for NoHooks
where
    S: Send + Sync + 'static,
    N: Send + Sync + 'static,
{
}

/// Resolves one connection field against a [`ConnectionSource`].
pub struct ConnectionResolver<S, N> {
    target: Target,
    order_enum: OrderEnum,
    translate: Arc<dyn FilterTranslate>,
    source: Arc<dyn ConnectionSource<S, N>>,
    hooks: Arc<dyn ConnectionHooks<S, N>>,
    config: ConnectionConfig,
}

impl<S, N> ConnectionResolver<S, N>
where
    S: Clone + Send + Sync + 'static,
    N: Record + 'static,
{
    /// Resolver with the primary-key order enum, equality filters and no hooks.
    pub fn new(target: Target, source: Arc<dyn ConnectionSource<S, N>>) -> Self {
        let order_enum = OrderEnum::primary_key(&target.model, &target.primary_key);
        Self {
            target,
            order_enum,
            translate: Arc::new(EqualityFilter),
            source,
            hooks: Arc::new(NoHooks),
            config: ConnectionConfig::default(),
        }
    }

    pub fn with_order_enum(mut self, order_enum: OrderEnum) -> Self {
        self.order_enum = order_enum;
        self
    }

    pub fn with_filter(mut self, translate: impl FilterTranslate + 'static) -> Self {
        self.translate = Arc::new(translate);
        self
    }

    pub fn with_hooks(mut self, hooks: impl ConnectionHooks<S, N> + 'static) -> Self {
        self.hooks = Arc::new(hooks);
        self
    }

    pub fn with_config(mut self, config: ConnectionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn order_enum(&self) -> &OrderEnum {
        &self.order_enum
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    fn shape_context(&self) -> ShapeContext<'_> {
        ShapeContext {
            target: &self.target,
            order_enum: &self.order_enum,
            translate: self.translate.as_ref(),
            config: &self.config,
        }
    }

    /// Parent passed to the source: only associations are scoped by it.
    fn scope<'s>(&self, source: Option<&'s S>) -> Option<&'s S> {
        if self.target.is_association() {
            source
        } else {
            None
        }
    }

    /// Resolve a connection field for the given selection.
    pub async fn resolve(
        &self,
        source: Option<&S>,
        args: ConnectionArgs,
        selection: &SimplifiedField,
    ) -> Result<ConnectionOutput<N, S>> {
        if !selection.selects_any(CONNECTION_FIELDS) {
            tracing::debug!(
                target_model = %self.target.label(),
                "Selection requests no connection data, returning descriptor"
            );
            let filter = args_to_where(&args.filters, self.translate.as_ref());
            return Ok(ConnectionOutput::Descriptor(ConnectionDescriptor {
                source: source.cloned(),
                args,
                filter,
            }));
        }

        self.fetch_connection(source, args)
            .await
            .map(ConnectionOutput::Connection)
    }

    /// Fetch the window described by `args` and assemble the page.
    pub async fn fetch_connection(
        &self,
        source: Option<&S>,
        args: ConnectionArgs,
    ) -> Result<Connection<N, S>> {
        let plan = shape_window(&args, self.shape_context())?;
        let params = self
            .hooks
            .before_fetch(plan.params.clone(), &args)
            .await
            .map_err(PaginationError::Hook)?;

        let scope = self.scope(source);
        let rows = self
            .source
            .fetch(&self.target, scope, &params)
            .await
            .map_err(PaginationError::Fetch)?;

        let full_count = match auxiliary_count(&rows) {
            Some(count) => count,
            None if rows.is_empty() => 0,
            None => {
                tracing::debug!(
                    target_model = %self.target.label(),
                    "No windowed count on fetched rows, issuing count query"
                );
                self.source
                    .count(&self.target, scope, &params.filter)
                    .await
                    .map_err(PaginationError::Count)?
            }
        };

        let fetched = rows.len();
        let edges = build_edges(rows, &plan);
        let page_info = page_info(&edges, &plan, full_count);

        tracing::debug!(
            target_model = %self.target.label(),
            fetched,
            full_count,
            has_next_page = page_info.has_next_page,
            has_previous_page = page_info.has_previous_page,
            "Resolved connection"
        );

        let connection = Connection {
            edges,
            page_info,
            full_count,
            descriptor: ConnectionDescriptor {
                source: source.cloned(),
                args,
                filter: params.filter,
            },
        };
        self.hooks
            .after_resolve(connection)
            .await
            .map_err(PaginationError::Hook)
    }
}
