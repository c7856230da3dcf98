//! Strong-branching candidate selection: a Driebeek-penalty pre-filter over basic
//! fractional edge variables, followed by a bounded-iteration primal-simplex probe of each
//! surviving candidate in both directions.

use tsp_core::{cut::BranchDirection as Direction, distance::EPSILON, node::Node};

use crate::{corelp::CoreLP, error::SolveResult};

const TOP_K_CANDIDATES: usize = 5;
const STRONG_BRANCH_ITLIM: usize = 5;

pub struct Candidate {
    pub edge_index: usize,
    pub edge: (Node, Node),
}

/// Every currently basic, genuinely fractional edge variable, with its Driebeek (Tomlin-style)
/// one-sided penalty: a lower bound, read straight off the current tableau row with no extra
/// pivoting, on how much the objective must rise if that variable is forced to 0 or to 1.
struct ScoredCandidate {
    candidate: Candidate,
    driebeek_floor: f64,
    driebeek_ceil: f64,
}

fn fractional_part(v: f64) -> Option<f64> {
    let f = v - v.floor();
    if f > EPSILON && f < 1.0 - EPSILON {
        Some(f)
    } else {
        None
    }
}

/// Only structural (edge) columns are considered, mirroring the safe-GMI separator's restriction
/// to the same columns: `get_reduced_costs` only reports structural reduced costs, so a slack
/// column's contribution can't be priced here without reaching back into the LP for its dual.
fn driebeek_penalties(tableau: &[f64], num_cols: usize, reduced_costs: &[f64], frac: f64, basic_col: usize) -> (f64, f64) {
    let mut floor_penalty = f64::INFINITY;
    let mut ceil_penalty = f64::INFINITY;
    for (col, &coeff) in tableau[..num_cols].iter().enumerate() {
        if col == basic_col || coeff.abs() <= EPSILON {
            continue;
        }
        let rc = reduced_costs.get(col).copied().unwrap_or(0.0).abs();
        if coeff > 0.0 {
            floor_penalty = floor_penalty.min(rc * frac / coeff);
        } else {
            ceil_penalty = ceil_penalty.min(rc * (1.0 - frac) / (-coeff));
        }
    }
    (
        if floor_penalty.is_finite() { floor_penalty } else { 0.0 },
        if ceil_penalty.is_finite() { ceil_penalty } else { 0.0 },
    )
}

fn scored_candidates(core: &CoreLP) -> Vec<ScoredCandidate> {
    let num_cols = core.graph().edge_count();
    let lp = core.lp();
    let header = lp.get_basis_header();
    let x = lp.get_x();
    let reduced_costs = lp.get_reduced_costs();

    let mut out = Vec::new();
    for (row, &basic_col) in header.iter().enumerate() {
        if basic_col >= num_cols {
            continue;
        }
        let Some(frac) = fractional_part(x[basic_col]) else {
            continue;
        };
        let tableau = lp.tableau_row(row);
        let (floor_penalty, ceil_penalty) = driebeek_penalties(&tableau, num_cols, &reduced_costs, frac, basic_col);
        let (u, v) = core.graph().edges()[basic_col].endpoints();
        out.push(ScoredCandidate {
            candidate: Candidate {
                edge_index: basic_col,
                edge: (u, v),
            },
            driebeek_floor: floor_penalty,
            driebeek_ceil: ceil_penalty,
        });
    }
    out
}

/// Product-rule score favoring candidates whose *weaker* direction still costs a lot (the
/// direction strong branching is most likely to prune), normalized by how many pivots were
/// allowed to establish it — a penalty reached in fewer iterations is more trustworthy than the
/// same-sized penalty that needed the full budget.
pub fn branch_score(itlim: usize, down_obj: Option<f64>, up_obj: Option<f64>, current_obj: f64) -> f64 {
    let itlim = itlim.max(1) as f64;
    let degrade = |obj: Option<f64>| -> f64 {
        match obj {
            None => f64::INFINITY,
            Some(o) => (o - current_obj).max(0.0) / itlim,
        }
    };
    let d = degrade(down_obj);
    let u = degrade(up_obj);
    match (d.is_finite(), u.is_finite()) {
        (false, false) => f64::INFINITY,
        (false, true) => u,
        (true, false) => d,
        (true, true) => d.min(u) * 1000.0 + d.max(u),
    }
}

/// Probes `edge_index` in one direction: clamps its bound, pivots up to `STRONG_BRANCH_ITLIM`
/// times, records the resulting objective (`None` if the clamp made the LP infeasible), then
/// restores the basis and bound exactly as they were.
fn probe_direction(core: &mut CoreLP, edge_index: usize, direction: Direction) -> SolveResult<Option<f64>> {
    let snapshot = core.snapshot_basis();
    core.clamp_edge(edge_index, direction);
    let mut result = Some(core.objective());
    for _ in 0..STRONG_BRANCH_ITLIM {
        match core.primal_pivot() {
            Ok(_) => result = Some(core.objective()),
            Err(_) => {
                result = None;
                break;
            }
        }
    }
    core.unclamp_edge(edge_index);
    core.restore_basis(&snapshot)?;
    Ok(result)
}

/// Selects the best branching edge by Driebeek pre-filter then strong branching, returning the
/// edge and both probed objectives (the caller installs whichever direction it descends into).
pub fn select_branch_edge(core: &mut CoreLP) -> SolveResult<Option<(Candidate, Option<f64>, Option<f64>)>> {
    let mut scored = scored_candidates(core);
    if scored.is_empty() {
        return Ok(None);
    }
    scored.sort_by(|a, b| {
        let key_a = a.driebeek_floor.min(a.driebeek_ceil);
        let key_b = b.driebeek_floor.min(b.driebeek_ceil);
        key_b.partial_cmp(&key_a).unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.truncate(TOP_K_CANDIDATES);

    let current_obj = core.objective();
    let mut best: Option<(Candidate, Option<f64>, Option<f64>, f64)> = None;
    for scored_candidate in scored {
        let edge_index = scored_candidate.candidate.edge_index;
        let down_obj = probe_direction(core, edge_index, Direction::Down)?;
        let up_obj = probe_direction(core, edge_index, Direction::Up)?;
        let score = branch_score(STRONG_BRANCH_ITLIM, down_obj, up_obj, current_obj);
        if best.as_ref().map_or(true, |(_, _, _, best_score)| score > *best_score) {
            best = Some((scored_candidate.candidate, down_obj, up_obj, score));
        }
    }
    Ok(best.map(|(candidate, down_obj, up_obj, _)| (candidate, down_obj, up_obj)))
}
