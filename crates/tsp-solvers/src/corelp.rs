//! `CoreLP`: owns the LP relaxation, its warm-startable basis, row metadata, and the cut pool.
//! Pivoting and row/column mutation are the only ways callers touch the underlying [`LpSolver`].

use log::{debug, trace};

use tsp_core::{
    clique::CliqueBank,
    cut::HyperGraph,
    distance::EPSILON,
    graph::{CoreGraph, Edge},
    node::Node,
    pool::{CutPool, RowMeta, DEFAULT_CUT_AGE_MAX, DEFAULT_POOL_SCAN_CAP},
    row::RowSense,
    tooth::ToothBank,
    tour::Tour,
};
use tsp_lp::{Basis, LpSolver, PivotOutcome, RowSpec, VarStatus};

use crate::{error::SolveError, support_graph::build_support_graph};

/// Classification of the x-vector produced by one primal pivot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PivType {
    Frac,
    Subtour,
    Tour,
    FathomedTour,
}

pub struct CoreLP {
    graph: CoreGraph,
    lp: Box<dyn LpSolver>,
    row_meta: Vec<RowMeta>,
    pool: CutPool,
    active_tour: Tour,
    active_basis: Basis,
}

impl CoreLP {
    /// Builds the degree-equation-only LP for `tour` over `graph` (no cuts yet).
    pub fn new(graph: CoreGraph, mut lp: Box<dyn LpSolver>, tour: Tour) -> SolveResultLocal<Self> {
        let n = graph.node_count();
        let obj: Vec<f64> = graph.edges().iter().map(|e| e.length.0 as f64).collect();
        let lower = vec![0.0; graph.edge_count()];
        let upper = vec![1.0; graph.edge_count()];
        lp.add_columns(&obj, &lower, &upper);

        let degree_rows: Vec<RowSpec> = (0..n)
            .map(|node| {
                let node = Node(node);
                let (indices, values) = degree_row_coeffs(&graph, node);
                RowSpec {
                    indices,
                    values,
                    sense: RowSense::Equal,
                    rhs: 2.0,
                }
            })
            .collect();
        lp.add_rows(&degree_rows);

        let row_meta = (0..n).map(|node| RowMeta::degree(Node(node))).collect();

        let mut core = Self {
            graph,
            lp,
            row_meta,
            pool: CutPool::new(),
            active_tour: tour.clone(),
            active_basis: Basis {
                col_status: vec![],
                row_status: vec![],
            },
        };
        core.set_active_tour(tour)?;
        Ok(core)
    }

    pub fn graph(&self) -> &CoreGraph {
        &self.graph
    }

    pub fn active_tour(&self) -> &Tour {
        &self.active_tour
    }

    pub fn pool(&self) -> &CutPool {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut CutPool {
        &mut self.pool
    }

    pub fn objective(&self) -> f64 {
        self.lp.objective()
    }

    pub fn x(&self) -> Vec<f64> {
        self.lp.get_x()
    }

    /// The opaque LP collaborator, for separators that need direct tableau access (safe-GMI).
    pub fn lp(&self) -> &dyn LpSolver {
        self.lp.as_ref()
    }

    /// Exact reduced cost of every column currently in the LP, in `CoreGraph` edge order.
    pub fn reduced_costs(&self) -> Vec<f64> {
        self.lp.get_reduced_costs()
    }

    /// The degree-equation dual for every node, indexed by [`Node`] (used by the pricer, which
    /// cannot afford to re-derive a not-yet-priced edge's coefficient against every cut row and
    /// so approximates new edges' reduced cost from degree duals alone).
    pub fn degree_duals(&self) -> Vec<f64> {
        let duals = self.lp.get_duals();
        let mut out = vec![0.0; self.graph.node_count()];
        for (row_index, meta) in self.row_meta.iter().enumerate() {
            if let tsp_core::pool::RowRef::DegreeEquation(node) = meta.reference {
                out[node.0] = duals[row_index];
            }
        }
        out
    }

    /// One primal simplex pivot from the current basis, classified into a `PivType`.
    pub fn primal_pivot(&mut self) -> SolveResultLocal<PivType> {
        match self.lp.pivot()? {
            PivotOutcome::Infeasible => {
                Err(SolveError::LpFailure("pivot reported infeasible".into()))
            }
            PivotOutcome::Unbounded => {
                Err(SolveError::LpFailure("pivot reported unbounded".into()))
            }
            PivotOutcome::Optimal => self.classify_current(),
        }
    }

    fn classify_current(&self) -> SolveResultLocal<PivType> {
        let x = self.lp.get_x();
        let support = build_support_graph(&self.graph, &x);
        if !support.integral {
            return Ok(PivType::Frac);
        }
        if !support.connected {
            return Ok(PivType::Subtour);
        }
        let all_degree_two = (0..support.node_count).all(|n| support.degree(Node(n)) == 2);
        if !all_degree_two {
            return Err(SolveError::invariant(
                "integral connected support graph with a non-degree-2 node is not a Hamiltonian cycle",
            ));
        }
        if self.is_fathomed(&x) {
            Ok(PivType::FathomedTour)
        } else {
            Ok(PivType::Tour)
        }
    }

    /// `FathomedTour`: the basis is dual-feasible and x equals the active tour exactly.
    fn is_fathomed(&self, x: &[f64]) -> bool {
        for (edge_index, &value) in x.iter().enumerate() {
            let is_tour_edge = self.active_tour.is_tour_edge(edge_index);
            let expected = if is_tour_edge { 1.0 } else { 0.0 };
            if (value - expected).abs() > EPSILON {
                return false;
            }
        }
        let reduced_costs = self.lp.get_reduced_costs();
        reduced_costs.iter().all(|&rc| rc >= -EPSILON)
    }

    /// Restores the active-tour basis; optionally flags rows whose slack is nonzero for pruning.
    pub fn pivot_back(&mut self, prune_slack: bool) -> SolveResultLocal<()> {
        self.lp.set_basis(&self.active_basis)?;
        self.lp.factor_basis()?;
        if prune_slack {
            let slacks = self.lp.get_slacks();
            let duals = self.lp.get_duals();
            for (meta, (&slack, &dual)) in self.row_meta.iter_mut().zip(slacks.iter().zip(duals.iter())) {
                meta.tick(slack.abs() >= EPSILON, dual.abs() < EPSILON);
            }
        }
        Ok(())
    }

    /// Appends HyperGraph cuts as LP rows, regenerating each `SparseRow` against the active tour.
    pub fn add_cuts(
        &mut self,
        cuts: Vec<HyperGraph>,
        cliques: &CliqueBank,
        teeth: &ToothBank,
    ) -> SolveResultLocal<()> {
        let mut specs = Vec::with_capacity(cuts.len());
        for cut in &cuts {
            let row = cut
                .produce(&self.graph, &self.active_tour, cliques, teeth)
                .ok_or_else(|| SolveError::invariant("cut handle produced no row against the active tour"))?;
            specs.push(RowSpec {
                indices: row.indices.clone(),
                values: row.values.iter().map(|&v| v as f64).collect(),
                sense: row.sense,
                rhs: row.rhs as f64,
            });
        }
        self.lp.add_rows(&specs);
        for cut in cuts {
            self.row_meta.push(RowMeta::cut(cut));
        }
        trace!("added {} cut rows, lp now has {} rows", specs.len(), self.lp.num_rows());
        Ok(())
    }

    /// Appends columns for newly priced-in edges, at lower bound. Callers must only pass
    /// edges not already present in `graph()` (the pricer checks `contains_edge` before calling).
    pub fn add_edges(&mut self, edges: Vec<Edge>) -> Vec<usize> {
        let obj: Vec<f64> = edges.iter().map(|e| e.length.0 as f64).collect();
        let lower = vec![0.0; edges.len()];
        let upper = vec![1.0; edges.len()];
        let new_graph_indices = self.graph.append_edges(edges);
        debug_assert_eq!(new_graph_indices.len(), obj.len());
        self.lp.add_columns(&obj, &lower, &upper);
        new_graph_indices
    }

    /// Replaces the active tour and its stored basis. Fails if `tour_nodes` is not a Hamiltonian
    /// cycle over `CoreGraph` edges.
    pub fn set_active_tour(&mut self, tour: Tour) -> SolveResultLocal<()> {
        let n_cols = self.lp.num_cols();
        let mut x = vec![0.0; n_cols];
        let mut col_status = vec![VarStatus::AtLower; n_cols];
        for edge_index in 0..n_cols {
            if tour.is_tour_edge(edge_index) {
                x[edge_index] = 1.0;
                col_status[edge_index] = VarStatus::Basic;
            }
        }
        let row_status = vec![VarStatus::Basic; self.lp.num_rows()];
        let basis = Basis { col_status, row_status };
        self.lp.set_basis(&basis)?;
        self.lp.set_col_values(&x);
        self.lp.factor_basis()?;
        self.active_basis = basis;
        self.active_tour = tour;
        debug!("active tour replaced, length = {:?}", self.active_tour.length());
        Ok(())
    }

    /// Deletes every row whose cut_type is `Gmi`.
    pub fn purge_gmi(&mut self, force: bool) -> SolveResultLocal<()> {
        let _ = force;
        let mut to_delete = Vec::new();
        for (row_index, meta) in self.row_meta.iter().enumerate() {
            if let tsp_core::pool::RowRef::Cut(hg) = &meta.reference {
                if hg.cut_type() == tsp_core::cut::CutType::Gmi {
                    to_delete.push(row_index);
                }
            }
        }
        if to_delete.is_empty() {
            return Ok(());
        }
        self.lp.delete_rows(&to_delete);
        for &index in to_delete.iter().rev() {
            self.row_meta.remove(index);
        }
        Ok(())
    }

    /// Rows currently aged past `DEFAULT_CUT_AGE_MAX` and exempt from aging (never pruned).
    pub fn prune_aged_rows(&mut self) -> SolveResultLocal<usize> {
        let mut to_delete = Vec::new();
        for (row_index, meta) in self.row_meta.iter().enumerate() {
            if !meta.is_exempt_from_aging() && meta.age >= DEFAULT_CUT_AGE_MAX {
                to_delete.push(row_index);
            }
        }
        if to_delete.is_empty() {
            return Ok(0);
        }
        let count = to_delete.len();
        for &index in &to_delete {
            if let tsp_core::pool::RowRef::Cut(hg) = self.row_meta[index].reference.clone() {
                self.pool.insert(hg);
            }
        }
        self.lp.delete_rows(&to_delete);
        for &index in to_delete.iter().rev() {
            self.row_meta.remove(index);
        }
        Ok(count)
    }

    pub fn pool_scan_cap(&self) -> usize {
        DEFAULT_POOL_SCAN_CAP
    }

    /// Appends a single-variable bound-fixing row for the branch controller. Exempt from
    /// aging by `RowMeta::cut`'s `CutType::Branch` classification.
    pub fn add_branch_cut(
        &mut self,
        edge: (Node, Node),
        direction: tsp_core::cut::BranchDirection,
        cliques: &CliqueBank,
        teeth: &ToothBank,
    ) -> SolveResultLocal<()> {
        let cut = HyperGraph {
            kind: tsp_core::cut::CutKind::Branch { edge, direction },
        };
        self.add_cuts(vec![cut], cliques, teeth)
    }

    /// Undoes the most recently added row. Branch clamps are always added and removed in strict
    /// LIFO order by the ABC tree walk, so there is never a need to address an arbitrary row.
    pub fn remove_last_row(&mut self) -> SolveResultLocal<()> {
        let last = self.lp.num_rows().checked_sub(1).ok_or_else(|| {
            SolveError::invariant("remove_last_row called with no rows present")
        })?;
        self.lp.delete_rows(&[last]);
        self.row_meta.remove(last);
        Ok(())
    }

    /// Fixes `edge_index`'s column bounds to a single value for the branch direction. Every edge
    /// column is created with bounds `[0, 1]` (`CoreLP::new`, `add_edges`), so `unclamp_edge`
    /// always restores exactly that range.
    pub fn clamp_edge(&mut self, edge_index: usize, direction: tsp_core::cut::BranchDirection) {
        let bound = match direction {
            tsp_core::cut::BranchDirection::Up => 1.0,
            tsp_core::cut::BranchDirection::Down => 0.0,
        };
        self.lp.set_bounds(edge_index, bound, bound);
    }

    pub fn unclamp_edge(&mut self, edge_index: usize) {
        self.lp.set_bounds(edge_index, 0.0, 1.0);
    }

    /// Snapshots the current basis so a caller (strong branching) can probe the LP under
    /// temporary bound changes and restore exactly this basis afterwards.
    pub fn snapshot_basis(&self) -> Basis {
        self.lp.get_basis()
    }

    pub fn restore_basis(&mut self, basis: &Basis) -> SolveResultLocal<()> {
        self.lp.set_basis(basis)?;
        self.lp.factor_basis()?;
        Ok(())
    }

    /// Removes priced-out edge columns. Tour-relative cuts (subtour/comb/domino) regenerate
    /// their `SparseRow` from node handles on every `produce()` call and need no fixing up; a
    /// stored `Gmi` row references edge-column indices directly, so it is rewritten through the
    /// index remap `CoreGraph::delete_edges` hands back, or dropped if it touched a deleted edge.
    pub fn eliminate_edges(&mut self, indices: Vec<usize>) -> SolveResultLocal<()> {
        if indices.is_empty() {
            return Ok(());
        }
        let mut sorted = indices.clone();
        sorted.sort_unstable();
        self.lp.delete_columns(&sorted);
        let remap = self.graph.delete_edges(sorted);

        let mut dropped_rows = Vec::new();
        for (row_index, meta) in self.row_meta.iter_mut().enumerate() {
            if let tsp_core::pool::RowRef::Cut(HyperGraph {
                kind: tsp_core::cut::CutKind::Gmi { row },
            }) = &mut meta.reference
            {
                let mut new_indices = Vec::with_capacity(row.indices.len());
                let mut dropped = false;
                for &idx in &row.indices {
                    match remap.get(&idx) {
                        Some(&new_idx) => new_indices.push(new_idx),
                        None => {
                            dropped = true;
                            break;
                        }
                    }
                }
                if dropped {
                    dropped_rows.push(row_index);
                } else {
                    row.indices = new_indices;
                }
            }
        }
        if !dropped_rows.is_empty() {
            self.lp.delete_rows(&dropped_rows);
            for &index in dropped_rows.iter().rev() {
                self.row_meta.remove(index);
            }
        }
        Ok(())
    }
}

fn degree_row_coeffs(graph: &CoreGraph, node: Node) -> (Vec<usize>, Vec<f64>) {
    let indices: Vec<usize> = graph.adjacency(node).iter().map(|&(_, idx)| idx).collect();
    let values = vec![1.0; indices.len()];
    (indices, values)
}

type SolveResultLocal<T> = Result<T, SolveError>;

#[cfg(test)]
mod tests {
    use super::*;
    use tsp_core::distance::Distance;
    use tsp_lp::simplex::DenseBoundedSimplex;

    fn square_graph_and_tour() -> (CoreGraph, Tour) {
        let mut g = CoreGraph::new(4);
        g.append_edges([
            Edge::new(Node(0), Node(1), Distance(1)),
            Edge::new(Node(1), Node(2), Distance(1)),
            Edge::new(Node(2), Node(3), Distance(1)),
            Edge::new(Node(3), Node(0), Distance(1)),
        ]);
        let tour = Tour::from_nodes(vec![Node(0), Node(1), Node(2), Node(3)], &g).unwrap();
        (g, tour)
    }

    #[test]
    fn fresh_corelp_starts_at_the_tour_objective() {
        let (g, tour) = square_graph_and_tour();
        let core = CoreLP::new(g, Box::new(DenseBoundedSimplex::new()), tour).unwrap();
        assert!((core.objective() - 4.0).abs() < 1e-6);
        let x = core.x();
        assert!(x.iter().all(|&v| (v - 1.0).abs() < 1e-6));
    }

    #[test]
    fn primal_pivot_on_a_pure_cycle_reports_fathomed_tour() {
        let (g, tour) = square_graph_and_tour();
        let mut core = CoreLP::new(g, Box::new(DenseBoundedSimplex::new()), tour).unwrap();
        let piv = core.primal_pivot().unwrap();
        assert_eq!(piv, PivType::FathomedTour);
    }
}
