//! Fast (odd-component, Padberg-Hong-style) and exact (min-cut based, Letchford-Lodi-style)
//! blossom separation. Both build a handle/teeth `Comb` candidate and accept it
//! only after regenerating its row and checking the primal guarantee directly.

use std::collections::HashMap;

use tsp_core::{
    cut::{CutKind, HyperGraph},
    distance::EPSILON,
    node::Node,
};

use crate::mincut::CapacityGraph;

use super::{tour_indicator, SeparationInput, Separator};

pub(crate) struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    pub(crate) fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    pub(crate) fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    pub(crate) fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[ra] = rb;
        }
    }
}

/// Accepts a handle/teeth comb candidate only if its regenerated row is violated by `x` and tight
/// at the tour's own indicator vector.
pub(crate) fn validate_comb(input: &mut SeparationInput, handle_nodes: &[Node], teeth_node_pairs: &[[Node; 2]]) -> Option<HyperGraph> {
    let handle = input.cliques.intern(handle_nodes, input.tour);
    let teeth: Vec<_> = teeth_node_pairs
        .iter()
        .map(|pair| input.cliques.intern(pair, input.tour))
        .collect();
    let hg = HyperGraph {
        kind: CutKind::Comb { handle, teeth },
    };
    let row = hg.produce(input.graph, input.tour, input.cliques, input.teeth)?;
    if row.violation(input.x) <= EPSILON {
        return None;
    }
    let tour_x = tour_indicator(input.graph, input.tour);
    if !row.is_tight(&tour_x, EPSILON) {
        return None;
    }
    Some(hg)
}

pub struct FastBlossomSeparator;

impl Separator for FastBlossomSeparator {
    fn name(&self) -> &'static str {
        "fast_blossom"
    }

    fn is_early(&self) -> bool {
        true
    }

    fn find_cuts(&self, input: &mut SeparationInput) -> Vec<HyperGraph> {
        let n = input.support.node_count;
        let mut uf = UnionFind::new(n);
        for edge in &input.support.edges {
            if edge.weight > 1.0 - EPSILON {
                uf.union(edge.u.0, edge.v.0);
            }
        }

        let mut boundary: HashMap<usize, Vec<(Node, Node)>> = HashMap::new();
        for edge in &input.support.edges {
            if edge.weight > 1.0 - EPSILON || edge.weight < EPSILON {
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

pub struct ExactBlossomSeparator;

impl Separator for ExactBlossomSeparator {
    fn name(&self) -> &'static str {
        "exact_blossom"
    }

    fn is_early(&self) -> bool {
        false
    }

    fn find_cuts(&self, input: &mut SeparationInput) -> Vec<HyperGraph> {
        let n = input.support.node_count;
        let mut cap = CapacityGraph::new(n);
        for edge in &input.support.edges {
            cap.add_edge(edge.u.0, edge.v.0, edge.weight);
        }

        let mut found = Vec::new();
        for edge in &input.support.edges {
            if edge.weight < EPSILON || edge.weight > 1.0 - EPSILON {
                continue;
            }
            let cut = crate::mincut::min_st_cut(&cap, edge.u.0, edge.v.0);
            if cut.value >= 2.0 - EPSILON {
                continue;
            }
            let side_size = cut.source_side.iter().filter(|&&s| s).count();
            let other_size = n - side_size;
            if side_size % 2 == 0 || side_size < 3 || other_size < 1 {
                continue;
            }
            let handle_nodes: Vec<Node> = (0..n).filter(|&i| cut.source_side[i]).map(Node).collect();
            let mut boundary_edges: Vec<(Node, Node)> = input
                .support
                .edges
                .iter()
                .filter(|e| cut.source_side[e.u.0] != cut.source_side[e.v.0] && e.weight >= EPSILON)
                .map(|e| {
                    if cut.source_side[e.u.0] {
                        (e.u, e.v)
                    } else {
                        (e.v, e.u)
                    }
                })
                .collect();
            if boundary_edges.len() < 3 {
                continue;
            }
            if boundary_edges.len() % 2 == 0 {
                boundary_edges.pop();
            }
            let teeth_pairs: Vec<[Node; 2]> = boundary_edges.iter().map(|&(a, b)| [a, b]).collect();
            if let Some(hg) = validate_comb(input, &handle_nodes, &teeth_pairs) {
                found.push(hg);
            }
        }
        found
    }
}
