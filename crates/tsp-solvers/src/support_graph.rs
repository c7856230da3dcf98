//! Builds a [`SupportGraph`] from the live LP x-vector. Rebuilt on every pivot.

use tsp_core::{
    distance::EPSILON,
    graph::CoreGraph,
    node::Node,
    support::{SupportEdge, SupportGraph},
};

/// Builds the support subgraph over edges with `x_e >= eps`, in `CoreGraph` order.
pub fn build_support_graph(graph: &CoreGraph, x: &[f64]) -> SupportGraph {
    let node_count = graph.node_count();
    let mut edges = Vec::new();
    let mut adjacency = vec![Vec::new(); node_count];

    for (core_edge_index, edge) in graph.edges().iter().enumerate() {
        let weight = x[core_edge_index];
        if weight < EPSILON {
            continue;
        }
        let support_index = edges.len();
        let (u, v) = edge.endpoints();
        edges.push(SupportEdge {
            u,
            v,
            core_edge_index,
            weight,
        });
        adjacency[u.0].push((v, support_index));
        adjacency[v.0].push((u, support_index));
    }

    let connected = is_connected(node_count, &adjacency);
    let integral = edges.iter().all(|e| (e.weight - e.weight.round()).abs() < EPSILON);

    SupportGraph {
        node_count,
        edges,
        adjacency,
        connected,
        integral,
    }
}

fn is_connected(node_count: usize, adjacency: &[Vec<(Node, usize)>]) -> bool {
    if node_count == 0 {
        return true;
    }
    let mut seen = vec![false; node_count];
    let mut stack = vec![0usize];
    seen[0] = true;
    let mut visited = 1;
    while let Some(node) = stack.pop() {
        for &(neighbor, _) in &adjacency[node] {
            if !seen[neighbor.0] {
                seen[neighbor.0] = true;
                visited += 1;
                stack.push(neighbor.0);
            }
        }
    }
    visited == node_count
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsp_core::{distance::Distance, graph::Edge};

    #[test]
    fn filters_out_near_zero_edges_and_detects_disconnection() {
        let mut g = CoreGraph::new(4);
        g.append_edges([
            Edge::new(Node(0), Node(1), Distance(1)),
            Edge::new(Node(2), Node(3), Distance(1)),
        ]);
        let x = [1.0, 1.0];
        let sg = build_support_graph(&g, &x);
        assert_eq!(sg.edges.len(), 2);
        assert!(!sg.connected);
        assert!(sg.integral);
    }

    #[test]
    fn detects_fractional_support() {
        let mut g = CoreGraph::new(3);
        g.append_edges([
            Edge::new(Node(0), Node(1), Distance(1)),
            Edge::new(Node(1), Node(2), Distance(1)),
            Edge::new(Node(2), Node(0), Distance(1)),
        ]);
        let x = [0.5, 0.5, 1.0];
        let sg = build_support_graph(&g, &x);
        assert!(sg.connected);
        assert!(!sg.integral);
    }
}
