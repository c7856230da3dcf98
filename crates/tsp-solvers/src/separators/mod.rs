//! The primal separator pipeline: each separator reads `(ActiveTour, x, SupportGraph,
//! CoreGraph, CutPool)` and returns a FIFO of candidate cuts, every one of which must satisfy the
//! primal guarantee — violated by `x` and tight at the tour.

pub mod blossom;
pub mod comb;
pub mod domino;
pub mod gmi;
pub mod poolsep;
pub mod subtour;

use tsp_core::{
    clique::CliqueBank, cut::HyperGraph, graph::CoreGraph, instance::Instance, pool::CutPool,
    support::SupportGraph, tooth::ToothBank, tour::Tour,
};
use tsp_lp::LpSolver;

/// Borrowed state every separator reads; `cliques`/`teeth` are mutable only so a separator can
/// intern newly discovered handles (no separator ever mutates `CoreLP`).
pub struct SeparationInput<'a> {
    pub graph: &'a CoreGraph,
    pub tour: &'a Tour,
    pub instance: &'a Instance,
    pub x: &'a [f64],
    pub support: &'a SupportGraph,
    pub pool: &'a CutPool,
    pub cliques: &'a mut CliqueBank,
    pub teeth: &'a mut ToothBank,
    pub lp: &'a dyn LpSolver,
}

pub trait Separator {
    fn name(&self) -> &'static str;

    /// Early separators trigger an immediate pipeline restart (the delta-ratio control) once
    /// they produce a cut that moves the pivot value enough.
    fn is_early(&self) -> bool;

    fn find_cuts(&self, input: &mut SeparationInput) -> Vec<HyperGraph>;
}

/// The fixed invocation order: pool re-pricing, exact subtour, fast and exact blossom, block
/// combs, simple domino parity, then safe GMI. Metamorphosis cuts are off by default and are not
/// implemented as a separate separator here.
pub fn default_pipeline() -> Vec<Box<dyn Separator>> {
    vec![
        Box::new(poolsep::PoolSeparator),
        Box::new(subtour::ExactSubtourSeparator),
        Box::new(blossom::FastBlossomSeparator),
        Box::new(blossom::ExactBlossomSeparator),
        Box::new(comb::BlockCombSeparator),
        Box::new(domino::DominoParitySeparator),
        Box::new(gmi::SafeGmiSeparator),
    ]
}

/// `x(tour)`'s edge-indicator vector over `graph`, for tightness checks against a cut's row.
pub(crate) fn tour_indicator(graph: &CoreGraph, tour: &Tour) -> Vec<f64> {
    (0..graph.edge_count())
        .map(|idx| if tour.is_tour_edge(idx) { 1.0 } else { 0.0 })
        .collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use tsp_core::{
        distance::Distance,
        graph::Edge,
        instance::{EdgeWeightType, InstanceMetadata, NodeCoordType, ProblemType},
        matrix::MatrixSym,
        node::Node,
    };

    /// A 6-node "blossom6"-style instance: a triangle of triangles whose subtour LP has an
    /// exposed blossom.
    pub fn blossom6_graph() -> CoreGraph {
        let mut g = CoreGraph::new(6);
        g.append_edges([
            Edge::new(Node(0), Node(1), Distance(1)),
            Edge::new(Node(1), Node(2), Distance(1)),
            Edge::new(Node(2), Node(0), Distance(1)),
            Edge::new(Node(3), Node(4), Distance(1)),
            Edge::new(Node(4), Node(5), Distance(1)),
            Edge::new(Node(5), Node(3), Distance(1)),
            Edge::new(Node(0), Node(3), Distance(2)),
            Edge::new(Node(1), Node(4), Distance(2)),
            Edge::new(Node(2), Node(5), Distance(2)),
        ]);
        g
    }

    /// An `Instance` with lengths matching [`blossom6_graph`]'s edges (and 3 elsewhere, the
    /// "across the triangles" diagonal), no real coordinates: these fixtures exercise the
    /// separation logic itself, not the geometric fallback path.
    pub fn blossom6_instance() -> Instance {
        let mut lengths = MatrixSym::new_from_dimension_with_value(6, Distance(3));
        let graph = blossom6_graph();
        for edge in graph.edges() {
            lengths.set_data(edge.from, edge.to, edge.length);
        }
        let metadata = InstanceMetadata {
            name: "blossom6".to_string(),
            problem_type: ProblemType::Tsp,
            comment: None,
            dimension: 6,
            edge_weight_type: EdgeWeightType::Explicit,
            edge_weight_format: None,
            node_coord_type: NodeCoordType::NoCoords,
            coords: None,
        };
        Instance::new(metadata, lengths)
    }
}
