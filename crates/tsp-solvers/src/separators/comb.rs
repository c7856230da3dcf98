//! Block combs: like [`blossom::FastBlossomSeparator`] but contracting support
//! edges at a looser threshold, catching larger "block" handles that a near-1 contraction misses.

use std::collections::HashMap;

use tsp_core::{cut::HyperGraph, distance::EPSILON, node::Node};

use super::{blossom::{validate_comb, UnionFind}, SeparationInput, Separator};

const BLOCK_CONTRACTION_THRESHOLD: f64 = 0.5;

pub struct BlockCombSeparator;

impl Separator for BlockCombSeparator {
    fn name(&self) -> &'static str {
        "block_comb"
    }

    fn is_early(&self) -> bool {
        true
    }

    fn find_cuts(&self, input: &mut SeparationInput) -> Vec<HyperGraph> {
        let n = input.support.node_count;
        let mut uf = UnionFind::new(n);
        for edge in &input.support.edges {
            if edge.weight >= BLOCK_CONTRACTION_THRESHOLD {
                uf.union(edge.u.0, edge.v.0);
            }
        }

        let mut boundary: HashMap<usize, Vec<(Node, Node)>> = HashMap::new();
        for edge in &input.support.edges {
            if edge.weight >= BLOCK_CONTRACTION_THRESHOLD || edge.weight < EPSILON {
                continue;
            }
            let cu = uf.find(edge.u.0);
            let cv = uf.find(edge.v.0);
            if cu == cv {
                continue;
            }
            boundary.entry(cu).or_default().push((edge.u, edge.v));
            boundary.entry(cv).or_default().push((edge.v, edge.u));
        }

        let mut found = Vec::new();
        for (comp, mut boundary_edges) in boundary {
            if boundary_edges.len() < 3 {
                continue;
            }
            if boundary_edges.len() % 2 == 0 {
                boundary_edges.pop();
            }
            let handle_nodes: Vec<Node> = (0..n).filter(|&i| uf.find(i) == comp).map(Node).collect();
            let teeth_pairs: Vec<[Node; 2]> = boundary_edges.iter().map(|&(a, b)| [a, b]).collect();
            if let Some(hg) = validate_comb(input, &handle_nodes, &teeth_pairs) {
                found.push(hg);
            }
        }
        found
    }
}
