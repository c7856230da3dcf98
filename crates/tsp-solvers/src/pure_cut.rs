//! The pure-cut loop: repeatedly calls [`cut_and_piv`], updates the incumbent on `Tour`,
//! runs the pricer on `FathomedTour`, and falls back to the x-tour heuristic on a stubborn `Frac`
//! before giving up and handing control to the branch controller.

use log::info;

use tsp_core::{distance::Distance, graph::Edge, tour::Tour};

use crate::{
    context::SolverContext,
    corelp::PivType,
    cut_and_piv::cut_and_piv,
    error::SolveResult,
    pricer::{self, BlockStatus},
    support_graph::build_support_graph,
    xtour,
};

pub fn cutting_loop(ctx: &mut SolverContext, do_price: bool, try_recover: bool) -> SolveResult<PivType> {
    loop {
        let piv = cut_and_piv(ctx)?;

        match piv {
            PivType::Tour => {
                let nodes = current_tour_nodes(ctx);
                let tour = Tour::from_nodes(nodes, ctx.core.graph())
                    .ok_or_else(|| tsp_core::error::SolveError::invariant("Tour pivot produced a non-Hamiltonian x-vector"))?;
                if ctx.offer_tour(tour.clone()) {
                    info!("new incumbent tour, length {:?}", tour.length());
                }
                ctx.set_active_tour(tour)?;
                if do_price {
                    let best = ctx.best_length();
                    pricer::gen_edges(&mut ctx.core, &ctx.instance, best, false)?;
                }
                continue;
            }
            PivType::FathomedTour => {
                if do_price {
                    let best = ctx.best_length();
                    let outcome = pricer::gen_edges(&mut ctx.core, &ctx.instance, best, true)?;
                    if outcome.status == BlockStatus::Full && outcome.added == 0 && outcome.eliminated == 0 {
                        return Ok(PivType::FathomedTour);
                    }
                    if outcome.status == BlockStatus::Full {
                        ctx.core.pivot_back(false)?;
                        continue;
                    }
                }
                return Ok(PivType::FathomedTour);
            }
            PivType::Frac => {
                if try_recover {
                    if let Some(better) = try_x_tour_recovery(ctx)? {
                        ctx.set_active_tour(better)?;
                        continue;
                    }
                }
                return Ok(PivType::Frac);
            }
            PivType::Subtour => {
                // cut_and_piv always resolves a Subtour pivot internally (via connect_components)
                // before returning, so this arm is unreachable in practice; treat it as Frac
                // defensively rather than panicking.
                return Ok(PivType::Frac);
            }
        }
    }
}

fn current_tour_nodes(ctx: &SolverContext) -> Vec<tsp_core::node::Node> {
    let x = ctx.core.x();
    let support = build_support_graph(ctx.core.graph(), &x);
    let mut nodes = Vec::with_capacity(support.node_count);
    let mut visited = vec![false; support.node_count];
    let mut current = tsp_core::node::Node(0);
    let mut prev = None;
    for _ in 0..support.node_count {
        nodes.push(current);
        visited[current.0] = true;
        let next = support.adjacency[current.0]
            .iter()
            .map(|&(n, _)| n)
            .find(|&n| Some(n) != prev && !visited[n.0]);
        prev = Some(current);
        if let Some(next) = next {
            current = next;
        } else {
            break;
        }
    }
    nodes
}

/// Runs the x-tour heuristic on the current fractional support and, if it beats the incumbent,
/// wires any edges it used that aren't already priced into `CoreGraph` and returns the result as
/// a `Tour` ready to install via `set_active_tour`.
fn try_x_tour_recovery(ctx: &mut SolverContext) -> SolveResult<Option<Tour>> {
    let x = ctx.core.x();
    let support = build_support_graph(ctx.core.graph(), &x);
    let candidate_nodes = xtour::x_tour_from_support(&ctx.instance, &support);
    if candidate_nodes.len() != support.node_count {
        return Ok(None);
    }
    let candidate_length: Distance = ctx.instance.tour_length(&candidate_nodes);
    if candidate_length >= ctx.best_length() {
        return Ok(None);
    }

    let n = candidate_nodes.len();
    let missing: Vec<Edge> = (0..n)
        .filter_map(|i| {
            let (u, v) = (candidate_nodes[i], candidate_nodes[(i + 1) % n]);
            if ctx.core.graph().contains_edge(u, v) {
                None
            } else {
                Some(Edge::new(u, v, ctx.instance.length(u, v)))
            }
        })
        .collect();
    if !missing.is_empty() {
        ctx.core.add_edges(missing);
    }
    let tour = Tour::from_nodes(candidate_nodes, ctx.core.graph())
        .ok_or_else(|| tsp_core::error::SolveError::invariant("x-tour heuristic produced a non-Hamiltonian cycle"))?;
    Ok(Some(tour))
}
