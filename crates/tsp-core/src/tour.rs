//! Tour representations: [`BestTour`] is the incumbent upper bound, [`ActiveTour`] is whatever
//! tour's 0/1 vector is the current LP basic solution (usually `BestTour`, sometimes a branch
//! tour).

use crate::{distance::Distance, graph::CoreGraph, node::Node};

/// A cyclic permutation of `0..n` together with its edge-indicator vector over a [`CoreGraph`].
#[derive(Debug, Clone)]
pub struct Tour {
    /// `tour_nodes[i]` is the node visited at position `i`.
    tour_nodes: Vec<Node>,
    /// `perm[tour_nodes[i]] = i`.
    perm: Vec<usize>,
    /// 0/1 indicator over `CoreGraph` edges, indexed by edge index.
    tour_edges: Vec<bool>,
    length: Distance,
}

impl Tour {
    /// Builds a `Tour` from a cyclic node permutation. Fails if some consecutive pair is not an
    /// edge of `graph` (mirrors `CoreLP::set_active_tour`'s failure semantics).
    pub fn from_nodes(tour_nodes: Vec<Node>, graph: &CoreGraph) -> Option<Self> {
        let n = tour_nodes.len();
        let mut perm = vec![0usize; n];
        for (position, &node) in tour_nodes.iter().enumerate() {
            perm[node.0] = position;
        }

        let mut tour_edges = vec![false; graph.edge_count()];
        let mut length = Distance::ZERO;
        for i in 0..n {
            let u = tour_nodes[i];
            let v = tour_nodes[(i + 1) % n];
            let edge_index = graph.edge_index(u, v)?;
            tour_edges[edge_index] = true;
            length += graph.edges()[edge_index].length;
        }

        Some(Self {
            tour_nodes,
            perm,
            tour_edges,
            length,
        })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.tour_nodes
    }

    pub fn position_of(&self, node: Node) -> usize {
        self.perm[node.0]
    }

    pub fn is_tour_edge(&self, edge_index: usize) -> bool {
        self.tour_edges.get(edge_index).copied().unwrap_or(false)
    }

    pub fn length(&self) -> Distance {
        self.length
    }

    pub fn node_count(&self) -> usize {
        self.tour_nodes.len()
    }

    /// The successor of `node` along the cycle.
    pub fn next(&self, node: Node) -> Node {
        let pos = self.perm[node.0];
        self.tour_nodes[(pos + 1) % self.tour_nodes.len()]
    }

    /// The predecessor of `node` along the cycle.
    pub fn prev(&self, node: Node) -> Node {
        let pos = self.perm[node.0];
        let n = self.tour_nodes.len();
        self.tour_nodes[(pos + n - 1) % n]
    }

    /// Nodes at tour positions `[start, start+len)` (mod n), in tour order.
    pub fn segment(&self, start: usize, len: usize) -> Vec<Node> {
        let n = self.tour_nodes.len();
        (0..len).map(|i| self.tour_nodes[(start + i) % n]).collect()
    }

    /// Re-syncs `tour_edges`/`length` against a (possibly mutated) `CoreGraph`, e.g. after edges
    /// were appended. Used by pricing after `gen_edges` grows the column set.
    pub fn resync_edges(&mut self, graph: &CoreGraph) {
        let n = self.tour_nodes.len();
        let mut tour_edges = vec![false; graph.edge_count()];
        let mut length = Distance::ZERO;
        for i in 0..n {
            let u = self.tour_nodes[i];
            let v = self.tour_nodes[(i + 1) % n];
            if let Some(edge_index) = graph.edge_index(u, v) {
                tour_edges[edge_index] = true;
                length += graph.edges()[edge_index].length;
            }
        }
        self.tour_edges = tour_edges;
        self.length = length;
    }
}

/// A plain (edges, cost) tour used by heuristics and lower-bound routines that have not yet been
/// related to a `CoreGraph`'s column indexing.
#[derive(Debug, Clone)]
pub struct UnEdgeTour {
    pub nodes: Vec<Node>,
    pub cost: Distance,
}
