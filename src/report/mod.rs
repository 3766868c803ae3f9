//! Endpoint topology report.
//!
//! Provides the node/edge storage the NAT reconciliation pass mutates:
//! - Deterministic endpoint node identifiers
//! - Endpoint nodes with adjacency sets and attribute maps
//! - The topology collection with explicit insert/replace/delete

mod id;
mod node;
mod topology;

pub use id::endpoint_node_id;
pub use node::{Node, COPY_OF};
pub use topology::Topology;
