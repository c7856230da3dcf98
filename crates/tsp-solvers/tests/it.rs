mod blossom6_cut;
mod brute_force_small;
mod reproducibility;
mod starting_tour_is_optimum;

use tsp_core::Node;
use tsp_lp::{simplex::DenseBoundedSimplex, LpSolver};
use tsp_solvers::{context::CutSelectionPreset, SolverContext};

/// Nearest-neighbor construction, duplicated from the `tsp-rs` binary's bootstrap step: this test
/// crate has no access to the binary's private helper.
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

fn context_for(instance: tsp_core::Instance, tour: Vec<Node>, seed: u64, preset: CutSelectionPreset) -> SolverContext {
    let lp: Box<dyn LpSolver> = Box::new(DenseBoundedSimplex::new());
    SolverContext::new(instance, lp, tour, preset, seed, true, true).unwrap()
}

fn brute_force_optimum(instance: &tsp_core::Instance) -> tsp_core::Distance {
    let n = instance.dimension();
    let rest: Vec<usize> = (1..n).collect();
    let mut best = tsp_core::Distance(i64::MAX);
    permute(&rest, &mut Vec::new(), &mut |perm| {
        let mut nodes = vec![Node(0)];
        nodes.extend(perm.iter().map(|&i| Node(i)));
        let len = instance.tour_length(&nodes);
        if len < best {
            best = len;
        }
    });
    best
}

fn permute(remaining: &[usize], chosen: &mut Vec<usize>, visit: &mut impl FnMut(&[usize])) {
    if remaining.is_empty() {
        visit(chosen);
        return;
    }
    for i in 0..remaining.len() {
        let mut rest = remaining.to_vec();
        let picked = rest.remove(i);
        chosen.push(picked);
        permute(&rest, chosen, visit);
        chosen.pop();
    }
}
