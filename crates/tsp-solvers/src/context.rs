//! `SolverContext`: the single owner of everything a solve run touches, replacing the
//! cyclic/back-referencing structures of a pointer-heavy design with one central owner.
//! Everything else in this crate borrows from it; nothing else owns an `Instance`, a
//! `CliqueBank`, or a `ToothBank`.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use tsp_core::{
    clique::CliqueBank,
    distance::Distance,
    instance::Instance,
    node::Node,
    tooth::ToothBank,
    tour::Tour,
};
use tsp_lp::LpSolver;

use crate::{corelp::CoreLP, error::SolveResult};

/// Which separators run and how aggressively rows age out, per `cutcontrol`-style preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutSelectionPreset {
    /// Every separator in `default_pipeline`, standard aging.
    Vanilla,
    /// Every separator, plus the delta-ratio restart fires more eagerly (smaller threshold) so
    /// more cuts get packed in per round.
    Aggressive,
    /// Skips domino-parity and safe-GMI (the two priciest separators), longer cut aging (rows
    /// survive more stale pivots before pruning) so the LP stays smaller.
    Sparse,
}

impl CutSelectionPreset {
    pub fn restart_threshold(&self) -> f64 {
        match self {
            CutSelectionPreset::Vanilla => 0.05,
            CutSelectionPreset::Aggressive => 0.01,
            CutSelectionPreset::Sparse => 0.10,
        }
    }

    pub fn runs_domino_and_gmi(&self) -> bool {
        !matches!(self, CutSelectionPreset::Sparse)
    }
}

/// Everything one solve run needs: the fixed instance, the mutable LP state, the cut-descriptor
/// banks separators intern into, the incumbent tour, and a seeded RNG for any tie-breaking that
/// must stay reproducible across runs given the same seed and preset.
pub struct SolverContext {
    pub instance: Instance,
    pub core: CoreLP,
    pub cliques: CliqueBank,
    pub teeth: ToothBank,
    pub preset: CutSelectionPreset,
    pub best_tour: Tour,
    pub rng: ChaCha8Rng,
    pub pricing_enabled: bool,
    pub branching_enabled: bool,
}

impl SolverContext {
    pub fn new(
        instance: Instance,
        lp: Box<dyn LpSolver>,
        starting_tour_nodes: Vec<Node>,
        preset: CutSelectionPreset,
        seed: u64,
        pricing_enabled: bool,
        branching_enabled: bool,
    ) -> SolveResult<Self> {
        let mut graph = tsp_core::graph::CoreGraph::new(instance.dimension());
        let n = starting_tour_nodes.len();
        let edges: Vec<tsp_core::graph::Edge> = (0..n)
            .map(|i| {
                let (u, v) = (starting_tour_nodes[i], starting_tour_nodes[(i + 1) % n]);
                tsp_core::graph::Edge::new(u, v, instance.length(u, v))
            })
            .collect();
        graph.append_edges(edges);
        let tour = Tour::from_nodes(starting_tour_nodes, &graph)
            .ok_or_else(|| tsp_core::error::SolveError::bad_input("starting tour is not a Hamiltonian cycle"))?;
        let best_tour = tour.clone();
        let core = CoreLP::new(graph, lp, tour)?;

        Ok(Self {
            instance,
            core,
            cliques: CliqueBank::new(),
            teeth: ToothBank::new(),
            preset,
            best_tour,
            rng: ChaCha8Rng::seed_from_u64(seed),
            pricing_enabled,
            branching_enabled,
        })
    }

    pub fn best_length(&self) -> Distance {
        self.best_tour.length()
    }

    /// Replaces the incumbent if `candidate` is strictly shorter; returns whether it improved.
    pub fn offer_tour(&mut self, candidate: Tour) -> bool {
        if candidate.length() < self.best_tour.length() {
            self.best_tour = candidate;
            true
        } else {
            false
        }
    }

    /// Installs `tour` as the LP's active tour, then rebases `cliques`/`teeth` against it. Every
    /// stored `Clique`/`SimpleTooth` is a tour-position-relative description of a node set; once
    /// the active tour changes, those positions mean something else until rebased. Must be used
    /// instead of `self.core.set_active_tour` for every tour-identity change.
    pub fn set_active_tour(&mut self, tour: Tour) -> SolveResult<()> {
        let old_tour = self.core.active_tour().clone();
        self.core.set_active_tour(tour)?;
        let new_tour = self.core.active_tour().clone();
        self.cliques.rebase(&old_tour, &new_tour);
        self.teeth.rebase(&old_tour, &new_tour);
        Ok(())
    }
}
