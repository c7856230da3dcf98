use tsp_solvers::{
    branch::{BranchController, BranchOutcome, NodeBudget},
    context::CutSelectionPreset,
    corelp::PivType,
    pure_cut::cutting_loop,
};

/// Every small random instance, solved end to end (cutting plane, falling back to branching if the
/// root does not fathom), must match the brute-force optimum exactly: proving any other answer
/// would mean a cut or branch somewhere is unsound.
#[test]
fn solver_matches_brute_force_optimum_on_small_random_instances() {
    for seed in [1u64, 2, 3, 4, 5] {
        let node_count = 8;
        let instance = tsp_parser::random_euclidean_instance(seed, node_count, 2_000);
        let expected = crate::brute_force_optimum(&instance);

        let tour = crate::nearest_neighbor_tour(&instance);
        let mut ctx = crate::context_for(instance, tour, seed, CutSelectionPreset::Vanilla);

        let piv = cutting_loop(&mut ctx, true, true).unwrap();
        if !matches!(piv, PivType::FathomedTour) {
            let outcome = BranchController::new().run(&mut ctx, &NodeBudget::unbounded()).unwrap();
            assert_eq!(outcome, BranchOutcome::Exhausted, "seed {seed}: branch tree should exhaust at n={node_count}");
        }
        assert_eq!(ctx.best_length(), expected, "seed {seed}: solver diverged from the brute-force optimum");
    }
}
