use criterion::{criterion_group, criterion_main, Criterion};

use tsp_core::Node;
use tsp_lp::{simplex::DenseBoundedSimplex, LpSolver};
use tsp_solvers::{context::CutSelectionPreset, cut_and_piv::cut_and_piv, SolverContext};

fn nearest_neighbor_tour(instance: &tsp_core::Instance) -> Vec<Node> {
    let n = instance.dimension();
    let mut visited = vec![false; n];
    let mut order = Vec::with_capacity(n);
    let mut current = Node(0);
    visited[0] = true;
    order.push(current);
    for _ in 1..n {
        let next = (0..n)
            .filter(|&i| !visited[i])
            .map(Node)
            .min_by_key(|&cand| instance.length(current, cand))
            .unwrap();
        visited[next.0] = true;
        order.push(next);
        current = next;
    }
    order
}

fn fresh_context(node_count: usize) -> SolverContext {
    let instance = tsp_parser::random_euclidean_instance(1, node_count, 10_000);
    let tour = nearest_neighbor_tour(&instance);
    let lp: Box<dyn LpSolver> = Box::new(DenseBoundedSimplex::new());
    SolverContext::new(instance, lp, tour, CutSelectionPreset::Vanilla, 1, false, false).unwrap()
}

fn bench_single_cut_and_piv(c: &mut Criterion) {
    let mut group = c.benchmark_group("cut_and_piv");
    for &n in &[20usize, 50, 100] {
        group.bench_function(format!("single pivot n={n}"), |b| {
            b.iter_batched(
                || fresh_context(n),
                |mut ctx| cut_and_piv(&mut ctx).unwrap(),
                criterion::BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_single_cut_and_piv);
criterion_main!(benches);
