//! The active edge set: a controlled, stably-indexed subset of the complete graph that currently
//! has an LP column.

use std::collections::HashMap;

use crate::{distance::Distance, node::Node};

#[derive(Debug, Clone, Copy)]
pub struct Edge {
    /// `from <= to`.
    pub from: Node,
    pub to: Node,
    pub length: Distance,
}

impl Edge {
    pub fn new(from: Node, to: Node, length: Distance) -> Self {
        if from <= to {
            Self { from, to, length }
        } else {
            Self {
                from: to,
                to: from,
                length,
            }
        }
    }

    pub fn endpoints(&self) -> (Node, Node) {
        (self.from, self.to)
    }
}

/// Ordered sequence of active edges, adjacency lists, and a `(u, v) -> edge index` lookup.
///
/// Indices are stable for the lifetime of an LP column: edges are only appended, or removed via
/// [`CoreGraph::delete_edges`], which renumbers every remaining edge and returns the index map
/// callers must use to rewrite any raw-coefficient cuts (GMI rows) they hold.
#[derive(Debug, Clone)]
pub struct CoreGraph {
    node_count: usize,
    edges: Vec<Edge>,
    adjacency: Vec<Vec<(Node, usize)>>,
    lookup: HashMap<(Node, Node), usize>,
}

impl CoreGraph {
    pub fn new(node_count: usize) -> Self {
        Self {
            node_count,
            edges: Vec::new(),
            adjacency: vec![Vec::new(); node_count],
            lookup: HashMap::new(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn adjacency(&self, node: Node) -> &[(Node, usize)] {
        &self.adjacency[node.0]
    }

    pub fn edge_index(&self, u: Node, v: Node) -> Option<usize> {
        let key = if u <= v { (u, v) } else { (v, u) };
        self.lookup.get(&key).copied()
    }

    pub fn contains_edge(&self, u: Node, v: Node) -> bool {
        self.edge_index(u, v).is_some()
    }

    /// Appends edges not already present. Returns the new edges' indices in the same order;
    /// edges already in the graph are skipped (no duplicate columns).
    pub fn append_edges(&mut self, new_edges: impl IntoIterator<Item = Edge>) -> Vec<usize> {
        let mut added = Vec::new();
        for edge in new_edges {
            let key = (edge.from, edge.to);
            if self.lookup.contains_key(&key) {
                continue;
            }
            let index = self.edges.len();
            self.edges.push(edge);
            self.lookup.insert(key, index);
            self.adjacency[edge.from.0].push((edge.to, index));
            self.adjacency[edge.to.0].push((edge.from, index));
            added.push(index);
        }
        added
    }

    /// Deletes the edges at the given indices (must be sorted ascending, deduplicated) and
    /// renumbers the rest. Returns an `old index -> new index` map for surviving edges (deleted
    /// edges are absent from the map) so callers can rewrite raw-coefficient rows.
    pub fn delete_edges(&mut self, mut indices_to_delete: Vec<usize>) -> HashMap<usize, usize> {
        indices_to_delete.sort_unstable();
        indices_to_delete.dedup();
        let to_delete: std::collections::HashSet<usize> = indices_to_delete.into_iter().collect();

        let mut remap = HashMap::new();
        let mut new_edges = Vec::with_capacity(self.edges.len() - to_delete.len());
        for (old_index, edge) in self.edges.iter().enumerate() {
            if to_delete.contains(&old_index) {
                continue;
            }
            remap.insert(old_index, new_edges.len());
            new_edges.push(*edge);
        }

        self.edges = new_edges;
        self.lookup.clear();
        self.adjacency = vec![Vec::new(); self.node_count];
        for (index, edge) in self.edges.iter().enumerate() {
            self.lookup.insert((edge.from, edge.to), index);
            self.adjacency[edge.from.0].push((edge.to, index));
            self.adjacency[edge.to.0].push((edge.from, index));
        }
        remap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_then_delete_preserves_survivors() {
        let mut g = CoreGraph::new(4);
        g.append_edges([
            Edge::new(Node(0), Node(1), Distance(1)),
            Edge::new(Node(1), Node(2), Distance(2)),
            Edge::new(Node(2), Node(3), Distance(3)),
        ]);
        assert_eq!(g.edge_count(), 3);
        let remap = g.delete_edges(vec![0]);
        assert_eq!(g.edge_count(), 2);
        assert!(g.contains_edge(Node(1), Node(2)));
        assert!(!g.contains_edge(Node(0), Node(1)));
        assert_eq!(remap.get(&1).copied(), Some(0));
        assert_eq!(remap.get(&2).copied(), Some(1));
        assert_eq!(remap.get(&0), None);
    }

    #[test]
    fn append_is_idempotent_on_duplicate_edges() {
        let mut g = CoreGraph::new(3);
        let added = g.append_edges([Edge::new(Node(0), Node(1), Distance(5))]);
        assert_eq!(added.len(), 1);
        let added_again = g.append_edges([Edge::new(Node(1), Node(0), Distance(5))]);
        assert!(added_again.is_empty());
        assert_eq!(g.edge_count(), 1);
    }
}
