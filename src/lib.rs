//! ORM Relay - cursor connections for ORM-backed GraphQL resolvers
//!
//! Turns Relay connection arguments (`first`, `after`, `last`, `before`,
//! `orderBy` and filters) into window fetch parameters, runs them through an
//! injected [`ConnectionSource`], and shapes the rows into edges, `PageInfo`
//! and a total count. Selections that ask for no connection data resolve to a
//! [`ConnectionDescriptor`] without touching storage.
//!
//! The [`graphql`] module wires resolvers into an async-graphql dynamic schema.

pub mod args;
pub mod config;
pub mod connection;
pub mod cursor;
pub mod demo;
pub mod error;
pub mod filter;
pub mod global_id;
pub mod graphql;
pub mod memory;
pub mod order;
pub mod plan;
pub mod resolver;
pub mod selection;
pub mod source;

pub use args::{ConnectionArgs, PageDirection};
pub use config::{ConnectionConfig, Dialect};
pub use connection::{
    Connection, ConnectionDescriptor, ConnectionOutput, Edge, PageInfo, resolve_edge,
};
pub use cursor::{Cursor, CursorPosition, decode_cursor, encode_cursor};
pub use error::{PaginationError, Result};
pub use filter::{EqualityFilter, FilterTranslate, WhereClause, args_to_where};
pub use global_id::{from_global_id, to_global_id};
pub use memory::MemorySource;
pub use order::{ComputedAttribute, OrderArg, OrderBy, OrderDirection, OrderEnum, OrderValue};
pub use plan::{ShapeContext, WindowPlan, shape_window};
pub use resolver::{ConnectionHooks, ConnectionResolver, NoHooks};
pub use selection::SimplifiedField;
pub use source::{
    Attribute, ConnectionSource, FetchParams, NodeLookup, Record, Target, TargetKind, WindowRow,
};
