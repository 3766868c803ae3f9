//! Endpoint nodes.

use std::collections::{BTreeMap, BTreeSet};

/// Attribute key recording clone provenance: the identifier of the node this
/// node was copied from during source-NAT correction.
pub const COPY_OF: &str = "copy_of";

/// A vertex in the endpoint topology: one (scope, address, port) observed in
/// traffic, the set of node IDs it was seen talking to, and its attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    /// Node IDs this node has observed traffic toward.
    pub adjacency: BTreeSet<String>,
    /// Attribute map. Keys are unique; insertion order is irrelevant.
    pub latest: BTreeMap<String, String>,
}

impl Node {
    /// Creates an empty node with the given identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            adjacency: BTreeSet::new(),
            latest: BTreeMap::new(),
        }
    }

    /// Returns this node under a different identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Returns this node with one adjacency entry added.
    pub fn with_adjacent(mut self, id: impl Into<String>) -> Self {
        self.adjacency.insert(id.into());
        self
    }

    /// Returns this node with an attribute set (replacing any prior value).
    pub fn with_latest(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.latest.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_id_keeps_contents() {
        let node = Node::new("a").with_adjacent("b").with_latest("k", "v");
        let renamed = node.clone().with_id("c");

        assert_eq!(renamed.id, "c");
        assert_eq!(renamed.adjacency, node.adjacency);
        assert_eq!(renamed.latest, node.latest);
    }

    #[test]
    fn test_with_adjacent_is_a_set() {
        let node = Node::new("a").with_adjacent("b").with_adjacent("b");
        assert_eq!(node.adjacency.len(), 1);
    }

    #[test]
    fn test_with_latest_replaces() {
        let node = Node::new("a").with_latest("k", "v1").with_latest("k", "v2");
        assert_eq!(node.latest.get("k").map(String::as_str), Some("v2"));
    }
}
