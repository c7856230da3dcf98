use criterion::{criterion_group, criterion_main, Criterion};

use tsp_core::Node;
use tsp_lp::{simplex::DenseBoundedSimplex, LpSolver};
use tsp_solvers::{
    context::CutSelectionPreset,
    cut_and_piv::cut_and_piv,
    separators::{default_pipeline, SeparationInput},
    support_graph::build_support_graph,
    SolverContext,
};

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

/// A context whose LP has already pivoted a few times, so its support graph carries the kind of
/// fractional slack a separation pass actually has to work against.
fn warmed_context(node_count: usize) -> SolverContext {
    let instance = tsp_parser::random_euclidean_instance(1, node_count, 10_000);
    let tour = nearest_neighbor_tour(&instance);
    let lp: Box<dyn LpSolver> = Box::new(DenseBoundedSimplex::new());
    let mut ctx = SolverContext::new(instance, lp, tour, CutSelectionPreset::Vanilla, 1, false, false).unwrap();
    for _ in 0..3 {
        if cut_and_piv(&mut ctx).is_err() {
            break;
        }
    }
    ctx
}

fn bench_pipeline_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("separation");
    for &n in &[20usize, 50, 100] {
        group.bench_function(format!("full pipeline pass n={n}"), |b| {
            b.iter_batched(
                || warmed_context(n),
                |mut ctx| {
                    let x = ctx.core.x();
                    let support = build_support_graph(ctx.core.graph(), &x);
                    let pipeline = default_pipeline();
                    let mut input = SeparationInput {
                        graph: ctx.core.graph(),
                        tour: ctx.core.active_tour(),
                        x: &x,
                        support: &support,
                        pool: ctx.core.pool(),
                        cliques: &mut ctx.cliques,
                        teeth: &mut ctx.teeth,
                        lp: ctx.core.lp(),
                    };
                    let mut total = 0;
                    for sep in &pipeline {
                        total += sep.find_cuts(&mut input).len();
                    }
                    total
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_pipeline_pass);
criterion_main!(benches);
