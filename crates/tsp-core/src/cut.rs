//! `HyperGraph`: the tour-relative, dedup-friendly description of a cut. Every variant's
//! `SparseRow` is regenerated deterministically from its handles and the current defining tour.

use std::collections::{HashMap, HashSet};

use crate::{
    clique::{CliqueBank, CliqueHandle},
    graph::CoreGraph,
    node::Node,
    row::{RowSense, SparseRow},
    tooth::{ToothBank, ToothHandle},
    tour::Tour,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchDirection {
    Up,
    Down,
}

#[derive(Debug, Clone)]
pub enum CutKind {
    /// Subtour elimination constraint over the node set of `clique`.
    Subtour { clique: CliqueHandle },
    /// Classical handle-and-teeth comb: `x(E(H)) + sum_i x(E(T_i)) <= |H| + sum_i floor(|T_i|/2)`.
    Comb {
        handle: CliqueHandle,
        teeth: Vec<CliqueHandle>,
    },
    /// Simple domino parity: aggregated from simple-tooth inequalities and a handle's degree
    /// equations, then halved and floored.
    Domino {
        handle: CliqueHandle,
        teeth: Vec<ToothHandle>,
        nonneg_edges: Vec<(Node, Node)>,
    },
    /// A raw, already-materialized row (safe-GMI output); not tour-relative.
    Gmi { row: SparseRow },
    /// A single-variable bound-fixing constraint installed by the branch controller.
    Branch {
        edge: (Node, Node),
        direction: BranchDirection,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutType {
    Subtour,
    Comb,
    Domino,
    Gmi,
    Branch,
}

#[derive(Debug, Clone)]
pub struct HyperGraph {
    pub kind: CutKind,
}

impl HyperGraph {
    pub fn cut_type(&self) -> CutType {
        match &self.kind {
            CutKind::Subtour { .. } => CutType::Subtour,
            CutKind::Comb { .. } => CutType::Comb,
            CutKind::Domino { .. } => CutType::Domino,
            CutKind::Gmi { .. } => CutType::Gmi,
            CutKind::Branch { .. } => CutType::Branch,
        }
    }

    /// Regenerates this cut's `SparseRow` against `graph`/`tour`. Returns `None` only for
    /// degenerate handles (empty clique etc.) which the separators that build `HyperGraph`s must
    /// never produce; callers may treat `None` as an `InvariantBreach`.
    pub fn produce(
        &self,
        graph: &CoreGraph,
        tour: &Tour,
        cliques: &CliqueBank,
        teeth: &ToothBank,
    ) -> Option<SparseRow> {
        match &self.kind {
            CutKind::Subtour { clique } => {
                let nodes = cliques.get(*clique).expand(tour);
                subtour_row(graph, &nodes)
            }
            CutKind::Comb { handle, teeth: tooth_cliques } => {
                let handle_nodes = cliques.get(*handle).expand(tour);
                let tooth_node_sets: Vec<Vec<Node>> =
                    tooth_cliques.iter().map(|h| cliques.get(*h).expand(tour)).collect();
                comb_row(graph, &handle_nodes, &tooth_node_sets)
            }
            CutKind::Domino {
                handle,
                teeth: tooth_handles,
                nonneg_edges,
            } => {
                let handle_nodes = cliques.get(*handle).expand(tour);
                domino_row(graph, tour, teeth, &handle_nodes, tooth_handles, nonneg_edges)
            }
            CutKind::Gmi { row } => Some(row.clone()),
            CutKind::Branch { edge, direction } => {
                let edge_index = graph.edge_index(edge.0, edge.1)?;
                let rhs = match direction {
                    BranchDirection::Up => 1,
                    BranchDirection::Down => 0,
                };
                Some(SparseRow::new(vec![edge_index], vec![1], RowSense::Equal, rhs))
            }
        }
    }
}

fn edges_within(graph: &CoreGraph, members: &HashSet<Node>) -> Vec<usize> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for &node in members {
        for &(neighbor, edge_index) in graph.adjacency(node) {
            if members.contains(&neighbor) && seen.insert(edge_index) {
                out.push(edge_index);
            }
        }
    }
    out
}

fn subtour_row(graph: &CoreGraph, members: &[Node]) -> Option<SparseRow> {
    if members.len() < 2 {
        return None;
    }
    let set: HashSet<Node> = members.iter().copied().collect();
    let indices = edges_within(graph, &set);
    let values = vec![1; indices.len()];
    Some(SparseRow::new(
        indices,
        values,
        RowSense::LessEq,
        members.len() as i64 - 1,
    ))
}

fn comb_row(graph: &CoreGraph, handle: &[Node], teeth: &[Vec<Node>]) -> Option<SparseRow> {
    if handle.is_empty() || teeth.len() < 3 || teeth.len() % 2 == 0 {
        return None;
    }
    let handle_set: HashSet<Node> = handle.iter().copied().collect();
    let mut coeffs: HashMap<usize, i64> = HashMap::new();
    for &edge_index in &edges_within(graph, &handle_set) {
        *coeffs.entry(edge_index).or_insert(0) += 1;
    }
    let mut rhs = handle.len() as i64;
    for tooth in teeth {
        if tooth.is_empty() {
            return None;
        }
        let tooth_set: HashSet<Node> = tooth.iter().copied().collect();
        for &edge_index in &edges_within(graph, &tooth_set) {
            *coeffs.entry(edge_index).or_insert(0) += 1;
        }
        rhs += tooth.len() as i64 / 2;
    }
    let (indices, values): (Vec<_>, Vec<_>) = coeffs.into_iter().unzip();
    Some(SparseRow::new(indices, values, RowSense::LessEq, rhs))
}

fn domino_row(
    graph: &CoreGraph,
    tour: &Tour,
    tooth_bank: &ToothBank,
    handle: &[Node],
    tooth_handles: &[ToothHandle],
    nonneg_edges: &[(Node, Node)],
) -> Option<SparseRow> {
    if tooth_handles.is_empty() {
        return None;
    }
    let mut doubled: HashMap<usize, i64> = HashMap::new();
    let mut doubled_rhs: i64 = 0;

    for &th in tooth_handles {
        let tooth = tooth_bank.get(th);
        let body_nodes = tooth.body_nodes(tour);
        let body_set: HashSet<Node> = body_nodes.iter().copied().collect();

        // 2x(E(body)) doubled -> coefficient 4
        for &edge_index in &edges_within(graph, &body_set) {
            *doubled.entry(edge_index).or_insert(0) += 4;
        }
        // x(E(root:body)) doubled -> coefficient 2
        for &(neighbor, edge_index) in graph.adjacency(tooth.root) {
            if body_set.contains(&neighbor) {
                *doubled.entry(edge_index).or_insert(0) += 2;
            }
        }
        // rhs: 2|body| - 1, doubled
        doubled_rhs += 2 * (2 * tooth.body_size() as i64 - 1);
    }

    // Handle degree equations x(delta(v)) = 2, doubled -> coefficient 2 per incident edge,
    // rhs contribution 4 per handle node.
    let handle_set: HashSet<Node> = handle.iter().copied().collect();
    for &node in handle {
        for &(_, edge_index) in graph.adjacency(node) {
            *doubled.entry(edge_index).or_insert(0) += 2;
        }
        doubled_rhs += 4;
        let _ = &handle_set;
    }

    for &(u, v) in nonneg_edges {
        if let Some(edge_index) = graph.edge_index(u, v) {
            *doubled.entry(edge_index).or_insert(0) += 2;
        }
    }

    let (indices, values): (Vec<_>, Vec<_>) = doubled.into_iter().unzip();
    Some(SparseRow::halved_floor(indices, values, doubled_rhs))
}
