//! The x-tour heuristic: builds a tour from a fractional LP solution's support edges,
//! then polishes it with bounded 2-opt. A practical stand-in for Concorde's full Lin-Kernighan
//! greedy-from-fractional routine — simpler, but grounded in the same idea: prefer the support
//! edges the LP already believes in, fall back to nearest-neighbor completion, then local search.

use std::collections::HashSet;

use tsp_core::{distance::Distance, instance::Instance, node::Node, support::SupportGraph};

use crate::separators::blossom::UnionFind;

/// Builds a Hamiltonian cycle by greedily accepting support edges in decreasing `x`-weight order
/// (skipping any that would give a node degree 3 or close a sub-cycle early), then completing the
/// resulting path fragments with a nearest-fragment-endpoint join, then running bounded 2-opt.
pub fn x_tour_from_support(instance: &Instance, support: &SupportGraph) -> Vec<Node> {
    let n = support.node_count;
    let mut degree = vec![0u8; n];
    let mut uf = UnionFind::new(n);
    let mut adjacency: Vec<Vec<Node>> = vec![Vec::new(); n];

    let mut edges: Vec<&tsp_core::support::SupportEdge> = support.edges.iter().collect();
    edges.sort_by(|a, b| b.weight.partial_cmp(&a.weight).unwrap());

    for edge in edges {
        let (u, v) = (edge.u.0, edge.v.0);
        if degree[u] >= 2 || degree[v] >= 2 {
            continue;
        }
        if uf.find(u) == uf.find(v) {
            continue;
        }
        uf.union(u, v);
        degree[u] += 1;
        degree[v] += 1;
        adjacency[u].push(edge.v);
        adjacency[v].push(edge.u);
    }

    complete_fragments(instance, n, &mut degree, &mut uf, &mut adjacency);
    let mut tour = walk_cycle(n, &adjacency);
    two_opt(instance, &mut tour);
    tour
}

/// Joins remaining degree-<2 fragment endpoints by nearest-neighbor distance until every node has
/// degree 2 and the fragments form a single cycle.
fn complete_fragments(
    instance: &Instance,
    n: usize,
    degree: &mut [u8],
    uf: &mut UnionFind,
    adjacency: &mut [Vec<Node>],
) {
    loop {
        let open: Vec<usize> = (0..n).filter(|&i| degree[i] < 2).collect();
        if open.len() <= 1 {
            break;
        }
        let anchor = open[0];
        let mut best = None;
        let mut best_len = Distance::MAX;
        for &candidate in &open[1..] {
            if candidate == anchor {
                continue;
            }
            let same_component = uf.find(anchor) == uf.find(candidate);
            let would_close_early = same_component && open.len() > 2;
            if would_close_early {
                continue;
            }
            let len = instance.length(Node(anchor), Node(candidate));
            if len < best_len {
                best_len = len;
                best = Some(candidate);
            }
        }
        let Some(partner) = best else {
            // Only two fragment endpoints left and they're already in the same component: close
            // the cycle directly.
            let partner = open[1];
            degree[anchor] += 1;
            degree[partner] += 1;
            adjacency[anchor].push(Node(partner));
            adjacency[partner].push(Node(anchor));
            continue;
        };
        uf.union(anchor, partner);
        degree[anchor] += 1;
        degree[partner] += 1;
        adjacency[anchor].push(Node(partner));
        adjacency[partner].push(Node(anchor));
    }
}

fn walk_cycle(n: usize, adjacency: &[Vec<Node>]) -> Vec<Node> {
    let mut visited = HashSet::with_capacity(n);
    let mut tour = Vec::with_capacity(n);
    let mut prev = None;
    let mut current = Node(0);
    for _ in 0..n {
        tour.push(current);
        visited.insert(current);
        let next = adjacency[current.0]
            .iter()
            .find(|&&cand| Some(cand) != prev && !visited.contains(&cand))
            .or_else(|| adjacency[current.0].iter().find(|&&cand| Some(cand) != prev));
        prev = Some(current);
        match next {
            Some(&nxt) if !visited.contains(&nxt) => current = nxt,
            _ => break,
        }
    }
    tour
}

const MAX_TWO_OPT_PASSES: usize = 25;

/// Bounded 2-opt: repeatedly reverses a segment if doing so shortens the tour, until a full pass
/// finds no improvement or the pass budget is exhausted.
fn two_opt(instance: &Instance, tour: &mut [Node]) {
    let n = tour.len();
    if n < 4 {
        return;
    }
    for _ in 0..MAX_TWO_OPT_PASSES {
        let mut improved = false;
        for i in 0..n - 1 {
            for j in (i + 2)..n {
                if i == 0 && j == n - 1 {
                    continue;
                }
                let a = tour[i];
                let b = tour[i + 1];
                let c = tour[j];
                let d = tour[(j + 1) % n];
                let before = instance.length(a, b) + instance.length(c, d);
                let after = instance.length(a, c) + instance.length(b, d);
                if after < before {
                    tour[i + 1..=j].reverse();
                    improved = true;
                }
            }
        }
        if !improved {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsp_core::{
        graph::{CoreGraph, Edge},
        instance::{EdgeWeightType, InstanceMetadata, NodeCoordType, ProblemType},
        matrix::MatrixSym,
    };

    fn square_instance() -> (Instance, CoreGraph) {
        let n = 4;
        let coords = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
        let lengths = MatrixSym::slow_new_from_fn(n, |a, b| {
            let (ax, ay) = coords[a.0];
            let (bx, by) = coords[b.0];
            Distance((((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()).round() as i64)
        });
        let metadata = InstanceMetadata {
            name: "square".into(),
            problem_type: ProblemType::Tsp,
            comment: None,
            dimension: n,
            edge_weight_type: EdgeWeightType::Euc2D,
            edge_weight_format: None,
            node_coord_type: NodeCoordType::TwoDCoords,
            coords: Some(coords.to_vec()),
        };
        let instance = Instance::new(metadata, lengths);
        let mut g = CoreGraph::new(n);
        g.append_edges([
            Edge::new(Node(0), Node(1), instance.length(Node(0), Node(1))),
            Edge::new(Node(1), Node(2), instance.length(Node(1), Node(2))),
            Edge::new(Node(2), Node(3), instance.length(Node(2), Node(3))),
            Edge::new(Node(3), Node(0), instance.length(Node(3), Node(0))),
            Edge::new(Node(0), Node(2), instance.length(Node(0), Node(2))),
            Edge::new(Node(1), Node(3), instance.length(Node(1), Node(3))),
        ]);
        (instance, g)
    }

    #[test]
    fn recovers_the_square_tour_from_its_own_support() {
        let (instance, g) = square_instance();
        let x = [1.0, 1.0, 1.0, 1.0, 0.0, 0.0];
        let support = crate::support_graph::build_support_graph(&g, &x);
        let tour = x_tour_from_support(&instance, &support);
        assert_eq!(tour.len(), 4);
        let seen: HashSet<_> = tour.iter().copied().collect();
        assert_eq!(seen.len(), 4);
        assert_eq!(instance.tour_length(&tour), Distance(4));
    }
}
