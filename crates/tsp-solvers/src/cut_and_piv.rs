//! The cut-and-piv driver: the strict `pivot -> separate -> add_cuts -> pivot` sequence,
//! with connected-component SECs handled as a bounded sub-loop and a delta-ratio restart rule
//! controlling when the separator scan starts over from the top of the pipeline.

use log::{debug, trace};

use tsp_core::{cut::CutKind, cut::HyperGraph, distance::EPSILON, node::Node};

use crate::{
    context::SolverContext,
    corelp::PivType,
    error::SolveResult,
    separators::{default_pipeline, SeparationInput, Separator},
    support_graph::build_support_graph,
};

/// One or more cut-and-piv restarts' worth of violation, expressed as a fraction of the active
/// tour's length, for the delta-ratio restart control.
fn delta_ratio(prev: f64, new: f64, tour_length: f64) -> f64 {
    if tour_length <= 0.0 {
        return 0.0;
    }
    (prev - new).abs() / tour_length
}

/// Emits one subtour cut per connected component of the current support graph, looped until a
/// single pivot reports `Subtour` no more (this is the only separator call permitted to run more
/// than once per step — this loop is explicitly the bounded exception).
fn connect_components(ctx: &mut SolverContext) -> SolveResult<Option<PivType>> {
    loop {
        let x = ctx.core.x();
        let support = build_support_graph(ctx.core.graph(), &x);
        if support.connected {
            return Ok(None);
        }
        let components = support.components();
        let num_components = components.iter().copied().max().map_or(0, |m| m + 1);
        let mut cuts = Vec::new();
        for comp_id in 0..num_components {
            let members: Vec<Node> = (0..support.node_count)
                .filter(|&n| components[n] == comp_id)
                .map(Node)
                .collect();
            if members.is_empty() || members.len() == support.node_count {
                continue;
            }
            let handle = ctx.cliques.intern(&members, ctx.core.active_tour());
            cuts.push(HyperGraph {
                kind: CutKind::Subtour { clique: handle },
            });
        }
        if cuts.is_empty() {
            return Err(tsp_core::error::SolveError::invariant(
                "disconnected support graph produced no component cuts",
            ));
        }
        ctx.core.add_cuts(cuts, &ctx.cliques, &ctx.teeth)?;
        let piv = ctx.core.primal_pivot()?;
        if matches!(piv, PivType::Tour | PivType::FathomedTour) {
            return Ok(Some(piv));
        }
    }
}

/// One full cut-and-piv cycle: repeated separation rounds until a tour is found, the separator
/// pipeline runs dry, or accumulated progress falls below `EPSILON`.
pub fn cut_and_piv(ctx: &mut SolverContext) -> SolveResult<PivType> {
    let pipeline = default_pipeline();
    let restart_threshold = ctx.preset.restart_threshold();

    loop {
        let piv = ctx.core.primal_pivot()?;
        if matches!(piv, PivType::Tour | PivType::FathomedTour) {
            return Ok(piv);
        }

        if piv == PivType::Subtour {
            if let Some(terminal) = connect_components(ctx)? {
                return Ok(terminal);
            }
        }

        let mut found_any = false;
        let mut total_delta = 0.0;
        let mut restart = false;

        'pipeline: for separator in &pipeline {
            if !ctx.preset.runs_domino_and_gmi()
                && matches!(separator.name(), "domino_parity" | "safe_gmi")
            {
                continue;
            }
            if separator.name() == "safe_gmi" && ctx.pricing_enabled {
                continue;
            }

            let prev_obj = ctx.core.objective();
            let tour_length = ctx.core.active_tour().length().0 as f64;
            let x = ctx.core.x();
            let support = build_support_graph(ctx.core.graph(), &x);

            let cuts = {
                let graph = ctx.core.graph();
                let tour = ctx.core.active_tour();
                let pool = ctx.core.pool();
                let lp = ctx.core.lp();
                let mut input = SeparationInput {
                    graph,
                    tour,
                    instance: &ctx.instance,
                    x: &x,
                    support: &support,
                    pool,
                    cliques: &mut ctx.cliques,
                    teeth: &mut ctx.teeth,
                    lp,
                };
                separator.find_cuts(&mut input)
            };

            if cuts.is_empty() {
                continue;
            }

            trace!("separator {} produced {} cuts", separator.name(), cuts.len());
            ctx.core.pivot_back(true)?;
            ctx.core.add_cuts(cuts, &ctx.cliques, &ctx.teeth)?;
            let piv = ctx.core.primal_pivot()?;
            let new_obj = ctx.core.objective();
            let delta = delta_ratio(prev_obj, new_obj, tour_length);
            total_delta += delta;

            if matches!(piv, PivType::Tour | PivType::FathomedTour) {
                return Ok(piv);
            }
            found_any = true;
            if delta >= restart_threshold || separator.is_early() {
                restart = true;
                break 'pipeline;
            }
        }

        if restart {
            continue;
        }
        if !found_any || total_delta < EPSILON {
            debug!("cut_and_piv settled at Frac, total delta {:.6}", total_delta);
            return Ok(PivType::Frac);
        }
    }
}
