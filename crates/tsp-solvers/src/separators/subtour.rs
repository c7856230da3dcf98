//! Exact segment subtour separation: a CCtsp linsub-style scan over every tour segment
//! of length `2..=n/2`, tight by integrality whenever it fires against an integral x.

use std::collections::HashSet;

use tsp_core::{cut::CutKind, cut::HyperGraph, distance::EPSILON, node::Node};

use super::{SeparationInput, Separator};

pub struct ExactSubtourSeparator;

impl Separator for ExactSubtourSeparator {
    fn name(&self) -> &'static str {
        "exact_subtour"
    }

    fn is_early(&self) -> bool {
        true
    }

    fn find_cuts(&self, input: &mut SeparationInput) -> Vec<HyperGraph> {
        let n = input.tour.node_count();
        if n < 4 {
            return Vec::new();
        }
        let mut found = Vec::new();
        let mut seen = HashSet::new();

        for start in 0..n {
            for len in 2..=(n / 2) {
                let nodes = input.tour.segment(start, len);
                let x_delta = boundary_weight(input, &nodes);
                if x_delta < 2.0 - EPSILON {
                    let handle = input.cliques.intern(&nodes, input.tour);
                    if seen.insert(handle) {
                        found.push(HyperGraph {
                            kind: CutKind::Subtour { clique: handle },
                        });
                    }
                }
            }
        }
        found
    }
}

/// `x(delta(S))` for the node set `members`, read off the support graph's adjacency (edges with
/// `x < eps` are already excluded there, so only border edges that actually matter are scanned).
fn boundary_weight(input: &SeparationInput, members: &[Node]) -> f64 {
    let set: HashSet<Node> = members.iter().copied().collect();
    let mut total = 0.0;
    for &node in members {
        for &(neighbor, support_index) in &input.support.adjacency[node.0] {
            if !set.contains(&neighbor) {
                total += input.support.edges[support_index].weight;
            }
        }
    }
    total
}
