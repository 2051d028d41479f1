//! async-graphql dynamic schema integration
//!
//! Type definitions for connections, the argument fragment, a field that
//! runs a [`ConnectionResolver`](crate::resolver::ConnectionResolver) and the
//! Relay `Node` interface.

pub mod args;
pub mod field;
pub mod node;
pub mod types;

pub use args::{connection_arguments, parse_connection_args};
pub use field::connection_field;
pub use node::{
    NODE, NodeTypeMapper, node_field, node_id_field, node_interface, node_object,
    register_node_interface,
};
pub use types::{
    ConnectionDefinitions, PAGE_INFO, TypeCache, connection_definitions, connection_type_name,
    edge_type_name,
};
