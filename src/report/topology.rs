//! Topology node collection.

use std::collections::HashMap;

use super::Node;

/// Endpoint nodes keyed by identifier.
///
/// Mutation is only through explicit insert/replace/delete, never through an
/// iterator, so a node can be removed while a rewrite pass over external
/// records is in flight without aliasing the entry being rewritten.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Topology {
    nodes: HashMap<String, Node>,
}

impl Topology {
    /// Creates an empty topology.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a node keyed by its own identifier, replacing any existing
    /// node under that identifier.
    pub fn add_node(&mut self, node: Node) {
        self.nodes.insert(node.id.clone(), node);
    }

    /// Looks up a node by identifier.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Removes a node, returning it if it was present.
    pub fn remove_node(&mut self, id: &str) -> Option<Node> {
        self.nodes.remove(id)
    }

    /// Whether a node with this identifier exists.
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the topology holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over node identifiers.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Iterates over nodes.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_lookup() {
        let mut topo = Topology::new();
        assert!(topo.is_empty());

        topo.add_node(Node::new("a").with_adjacent("b"));
        assert_eq!(topo.len(), 1);
        assert!(topo.contains("a"));
        assert!(topo.node("a").unwrap().adjacency.contains("b"));
        assert!(topo.node("b").is_none());
    }

    #[test]
    fn test_add_node_replaces() {
        let mut topo = Topology::new();
        topo.add_node(Node::new("a").with_adjacent("b"));
        topo.add_node(Node::new("a").with_adjacent("c"));

        assert_eq!(topo.len(), 1);
        let node = topo.node("a").unwrap();
        assert!(!node.adjacency.contains("b"));
        assert!(node.adjacency.contains("c"));
    }

    #[test]
    fn test_remove_node() {
        let mut topo = Topology::new();
        topo.add_node(Node::new("a"));

        let removed = topo.remove_node("a");
        assert_eq!(removed.map(|n| n.id), Some("a".to_string()));
        assert!(topo.is_empty());
        assert!(topo.remove_node("a").is_none());
    }
}
