//! Pool re-pricing: before any fresh separation runs, re-price the cuts
//! already sitting in `CutPool` against the current `x` and hand back whichever are violated and
//! still tight at the tour. Cheap compared to the rest of the pipeline, so it always goes first.

use tsp_core::{cut::HyperGraph, distance::EPSILON, pool::DEFAULT_POOL_SCAN_CAP};

use super::{tour_indicator, SeparationInput, Separator};

pub struct PoolSeparator;

impl Separator for PoolSeparator {
    fn name(&self) -> &'static str {
        "pool"
    }

    fn is_early(&self) -> bool {
        true
    }

    fn find_cuts(&self, input: &mut SeparationInput) -> Vec<HyperGraph> {
        let tour_x = tour_indicator(input.graph, input.tour);
        let mut found = Vec::new();
        for cut in input.pool.scan_window(DEFAULT_POOL_SCAN_CAP) {
            let Some(row) = cut.produce(input.graph, input.tour, input.cliques, input.teeth) else {
                continue;
            };
            if row.violation(input.x) <= EPSILON {
                continue;
            }
            if row.is_tight(&tour_x, EPSILON) {
                found.push(cut.clone());
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::separators::test_support::{blossom6_graph, blossom6_instance};
    use crate::support_graph::build_support_graph;
    use tsp_core::{
        clique::CliqueBank,
        cut::CutKind,
        node::Node,
        pool::CutPool,
        tooth::ToothBank,
        tour::Tour,
    };
    use tsp_lp::{simplex::DenseBoundedSimplex, LpSolver};

    #[test]
    fn reprices_a_stored_cut_that_is_now_violated() {
        let g = blossom6_graph();
        let tour = Tour::from_nodes(
            vec![Node(0), Node(1), Node(4), Node(3), Node(5), Node(2)],
            &g,
        )
        .unwrap();
        let x = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0];
        let support = build_support_graph(&g, &x);
        let instance = blossom6_instance();
        let mut cliques = CliqueBank::new();
        let mut teeth = ToothBank::new();
        let handle = cliques.intern(&[Node(0), Node(1), Node(2)], &tour);
        let mut pool = CutPool::new();
        pool.insert(HyperGraph {
            kind: CutKind::Subtour { clique: handle },
        });
        let lp = DenseBoundedSimplex::new();
        let mut input = SeparationInput {
            graph: &g,
            tour: &tour,
            instance: &instance,
            x: &x,
            support: &support,
            pool: &pool,
            cliques: &mut cliques,
            teeth: &mut teeth,
            lp: &lp as &dyn LpSolver,
        };
        let cuts = PoolSeparator.find_cuts(&mut input);
        assert_eq!(cuts.len(), 1);
    }

    #[test]
    fn does_not_reprice_a_cut_that_is_satisfied() {
        let g = blossom6_graph();
        let tour = Tour::from_nodes(
            vec![Node(0), Node(1), Node(4), Node(3), Node(5), Node(2)],
            &g,
        )
        .unwrap();
        let x = [1.0; 9];
        let support = build_support_graph(&g, &x);
        let instance = blossom6_instance();
        let mut cliques = CliqueBank::new();
        let mut teeth = ToothBank::new();
        let handle = cliques.intern(&[Node(0), Node(1), Node(2)], &tour);
        let mut pool = CutPool::new();
        pool.insert(HyperGraph {
            kind: CutKind::Subtour { clique: handle },
        });
        let lp = DenseBoundedSimplex::new();
        let mut input = SeparationInput {
            graph: &g,
            tour: &tour,
            instance: &instance,
            x: &x,
            support: &support,
            pool: &pool,
            cliques: &mut cliques,
            teeth: &mut teeth,
            lp: &lp as &dyn LpSolver,
        };
        let cuts = PoolSeparator.find_cuts(&mut input);
        assert!(cuts.is_empty());
    }
}
