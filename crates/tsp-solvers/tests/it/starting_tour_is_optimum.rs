use tsp_core::{
    distance::Distance,
    instance::{EdgeWeightType, Instance, InstanceMetadata, NodeCoordType, ProblemType},
    matrix::MatrixSym,
    Node,
};
use tsp_solvers::{context::CutSelectionPreset, corelp::PivType, cut_and_piv::cut_and_piv};

/// A unit square: the nearest-neighbor tour from node 0 is already the unique optimal cycle, so
/// the very first pivot should come back fathomed without a single cut added.
fn square_instance() -> Instance {
    let coords = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
    let lengths = MatrixSym::slow_new_from_fn(4, |a, b| {
        let (ax, ay) = coords[a.0];
        let (bx, by) = coords[b.0];
        Distance((((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()).round() as i64)
    });
    let metadata = InstanceMetadata {
        name: "square4".to_string(),
        problem_type: ProblemType::Tsp,
        comment: None,
        dimension: 4,
        edge_weight_type: EdgeWeightType::Euc2D,
        edge_weight_format: None,
        node_coord_type: NodeCoordType::TwoDCoords,
        coords: Some(coords.to_vec()),
    };
    Instance::new(metadata, lengths)
}

#[test]
fn first_pivot_on_an_already_optimal_tour_is_fathomed() {
    let instance = square_instance();
    let tour = vec![Node(0), Node(1), Node(2), Node(3)];
    let mut ctx = crate::context_for(instance, tour, 1, CutSelectionPreset::Vanilla);

    let rows_before = ctx.core.lp().num_rows();
    let piv = cut_and_piv(&mut ctx).unwrap();
    assert_eq!(piv, PivType::FathomedTour);
    assert_eq!(ctx.core.lp().num_rows(), rows_before, "no cut should have been necessary");
    assert_eq!(ctx.core.active_tour().length(), Distance(40));
}
