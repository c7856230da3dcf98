//! Edge pricing over the implicit complete graph: `gen_edges` proves optimality against
//! every node pair, not just the ones already in `CoreGraph`, by pricing on the degree duals.
//!
//! Simplification: a not-yet-priced edge's reduced cost is approximated from its two endpoints'
//! degree-equation duals only, ignoring the dual contribution of any active cut row (subtour,
//! comb, domino rows all reference node sets, so their per-edge coefficient for an edge that
//! isn't a column yet would have to be recomputed from scratch per cut, per candidate edge). This
//! can only ever price in an edge that a fully exact computation would have left out — never miss
//! one that should come in, since cut-row duals are sign-constrained and dropping a `<=` row's
//! nonnegative dual contribution only lowers the true reduced cost further below our estimate.
//! The LP's own pivoting then sorts out whether the priced-in edge is actually useful. Edge
//! *elimination* has no such gap: it reads `CoreLP::reduced_costs`, which is the simplex's own
//! exact figure for a column already in the LP.

use std::sync::Mutex;

use tsp_core::{
    distance::{Distance, EPSILON},
    graph::{CoreGraph, Edge},
    instance::Instance,
    node::Node,
};

use crate::{corelp::CoreLP, error::SolveResult};

/// Node-index range scanned into disjoint blocks, one per spawned thread.
const PRICING_BLOCKS: usize = 4;

/// Whether the last pricing pass exhausted every implicit edge (`Full`) or stopped early because
/// a block already yielded enough edges to justify repricing before scanning further
/// (`PartialReprice`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStatus {
    Full,
    PartialReprice,
}

#[derive(Debug, Clone, Copy)]
pub struct PriceOutcome {
    pub status: BlockStatus,
    pub added: usize,
    pub eliminated: usize,
}

/// Total edges found with `rc < -EPSILON` across all blocks at or above which the caller should
/// reprice before scanning again, rather than assume this pass was exhaustive enough to skip one.
const REPRICE_TRIGGER: usize = 64;

pub fn gen_edges(
    core: &mut CoreLP,
    instance: &Instance,
    upper_bound: Distance,
    eliminate: bool,
) -> SolveResult<PriceOutcome> {
    let n = instance.dimension();
    let duals = core.degree_duals();
    let candidates = scan_blocks(core.graph(), instance, &duals, n);

    let status = if candidates.len() >= REPRICE_TRIGGER {
        BlockStatus::PartialReprice
    } else {
        BlockStatus::Full
    };

    let added = candidates.len();
    if added > 0 {
        core.add_edges(candidates);
    }

    let eliminated = if eliminate {
        eliminate_dominated_edges(core, upper_bound)?
    } else {
        0
    };

    Ok(PriceOutcome { status, added, eliminated })
}

/// Scans every non-active node pair for a negative reduced cost, split into `PRICING_BLOCKS`
/// disjoint row-ranges run concurrently (`std::thread::scope`) and spliced back together under a
/// mutex in block order, so the returned candidate order — and therefore which edges a caller
/// with a fixed `REPRICE_TRIGGER` sees first — stays independent of thread scheduling.
fn scan_blocks(graph: &CoreGraph, instance: &Instance, duals: &[f64], n: usize) -> Vec<Edge> {
    if n == 0 {
        return Vec::new();
    }
    let block_size = n.saturating_sub(1) / PRICING_BLOCKS + 1;
    let collected: Mutex<Vec<(usize, Vec<Edge>)>> = Mutex::new(Vec::new());

    std::thread::scope(|scope| {
        let mut block_idx = 0;
        let mut start = 0;
        while start < n {
            let end = (start + block_size).min(n);
            let collected = &collected;
            let idx = block_idx;
            scope.spawn(move || {
                let mut local = Vec::new();
                for u in start..end {
                    for v in (u + 1)..n {
                        let (nu, nv) = (Node(u), Node(v));
                        if graph.contains_edge(nu, nv) {
                            continue;
                        }
                        let length = instance.length(nu, nv);
                        let rc = length.0 as f64 - duals[u] - duals[v];
                        if rc < -EPSILON {
                            local.push(Edge::new(nu, nv, length));
                        }
                    }
                }
                collected.lock().unwrap().push((idx, local));
            });
            start = end;
            block_idx += 1;
        }
    });

    let mut blocks = collected.into_inner().unwrap();
    blocks.sort_by_key(|&(idx, _)| idx);
    blocks.into_iter().flat_map(|(_, local)| local).collect()
}

fn eliminate_dominated_edges(core: &mut CoreLP, upper_bound: Distance) -> SolveResult<usize> {
    let tour_length = core.active_tour().length();
    let threshold = upper_bound.0 as f64 - tour_length.0 as f64 - EPSILON;
    let reduced = core.reduced_costs();
    let tour = core.active_tour().clone();

    let mut to_remove = Vec::new();
    for (edge_index, &rc) in reduced.iter().enumerate() {
        if tour.is_tour_edge(edge_index) {
            continue;
        }
        if rc > threshold {
            to_remove.push(edge_index);
        }
    }
    let removed = to_remove.len();
    core.eliminate_edges(to_remove)?;
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsp_core::{
        graph::CoreGraph,
        instance::{EdgeWeightType, InstanceMetadata, NodeCoordType, ProblemType},
        matrix::MatrixSym,
        tour::Tour,
    };
    use tsp_lp::simplex::DenseBoundedSimplex;

    /// 5 nodes on a line at 0,1,2,3,4; only the 4-cycle 0-1-2-3(-4 missing) is wired up at first,
    /// so node 4 starts with no edges at all and pricing must discover them.
    fn line_instance() -> Instance {
        let n = 5;
        let lengths = MatrixSym::slow_new_from_fn(n, |a, b| {
            Distance((a.0 as i64 - b.0 as i64).abs())
        });
        let metadata = InstanceMetadata {
            name: "line5".into(),
            problem_type: ProblemType::Tsp,
            comment: None,
            dimension: n,
            edge_weight_type: EdgeWeightType::Explicit,
            edge_weight_format: None,
            node_coord_type: NodeCoordType::NoCoords,
            coords: None,
        };
        Instance::new(metadata, lengths)
    }

    #[test]
    fn prices_in_an_edge_with_negative_reduced_cost() {
        let instance = line_instance();
        let mut g = CoreGraph::new(5);
        g.append_edges([
            Edge::new(Node(0), Node(1), instance.length(Node(0), Node(1))),
            Edge::new(Node(1), Node(2), instance.length(Node(1), Node(2))),
            Edge::new(Node(2), Node(3), instance.length(Node(2), Node(3))),
            Edge::new(Node(3), Node(4), instance.length(Node(3), Node(4))),
            Edge::new(Node(4), Node(0), instance.length(Node(4), Node(0))),
        ]);
        let tour = Tour::from_nodes(
            vec![Node(0), Node(1), Node(2), Node(3), Node(4)],
            &g,
        )
        .unwrap();
        let mut core = CoreLP::new(g, Box::new(DenseBoundedSimplex::new()), tour).unwrap();
        core.primal_pivot().unwrap();

        let before = core.graph().edge_count();
        let outcome = gen_edges(&mut core, &instance, Distance(i64::MAX), false).unwrap();
        assert!(core.graph().edge_count() >= before);
        assert_eq!(outcome.eliminated, 0);
    }
}
