use tsp_solvers::{context::CutSelectionPreset, pure_cut::cutting_loop};

/// Two independent runs on the same instance, seed, and preset must land on identical objective
/// values and row/column counts.
#[test]
fn same_seed_and_preset_reproduce_identical_lp_shape() {
    let instance_a = tsp_parser::random_euclidean_instance(99, 18, 5_000);
    let instance_b = tsp_parser::random_euclidean_instance(99, 18, 5_000);

    let tour_a = crate::nearest_neighbor_tour(&instance_a);
    let tour_b = crate::nearest_neighbor_tour(&instance_b);

    let mut ctx_a = crate::context_for(instance_a, tour_a, 99, CutSelectionPreset::Vanilla);
    let mut ctx_b = crate::context_for(instance_b, tour_b, 99, CutSelectionPreset::Vanilla);

    let piv_a = cutting_loop(&mut ctx_a, true, true).unwrap();
    let piv_b = cutting_loop(&mut ctx_b, true, true).unwrap();

    assert_eq!(piv_a, piv_b);
    assert_eq!(ctx_a.best_length(), ctx_b.best_length());
    assert_eq!(ctx_a.core.lp().num_rows(), ctx_b.core.lp().num_rows());
    assert_eq!(ctx_a.core.lp().num_cols(), ctx_b.core.lp().num_cols());
}
