//! Augment-branch-cut controller: best-first branch-and-cut over single-edge clamps, each
//! node re-entering the cutting loop from a branch tour that satisfies every clamp on its
//! root-to-node path.

pub mod branch_tour;
pub mod strong_branch;

use std::{cmp::Reverse, collections::BinaryHeap};

use log::{debug, info};

use tsp_core::{
    branch::{BranchNode, BranchNodeId, Direction, NType, NodeStatus},
    distance::Distance,
    graph::Edge,
    tour::Tour,
};

use crate::{context::SolverContext, corelp::PivType, error::SolveResult, pure_cut::cutting_loop};

use branch_tour::Clamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchOutcome {
    /// The tree was exhausted: `ctx.best_tour` is proved optimal.
    Exhausted,
    /// The node budget ran out with nodes still open; `ctx.best_tour` is the best tour found.
    BudgetExpired,
}

pub struct NodeBudget {
    pub max_nodes: Option<usize>,
}

impl NodeBudget {
    pub fn unbounded() -> Self {
        Self { max_nodes: None }
    }
}

type FrontierKey = (Reverse<Distance>, u32, u32);

pub struct BranchController {
    nodes: Vec<BranchNode>,
    frontier: BinaryHeap<FrontierKey>,
    /// Root-to-node path of the clamp currently installed in `ctx.core`, as a stack of visited
    /// node ids (root excluded, since the root carries no clamp of its own).
    current_path: Vec<BranchNodeId>,
}

impl BranchController {
    pub fn new() -> Self {
        let root = BranchNode::root();
        Self {
            nodes: vec![root],
            frontier: BinaryHeap::new(),
            current_path: Vec::new(),
        }
    }

    fn node(&self, id: BranchNodeId) -> &BranchNode {
        &self.nodes[id.0 as usize]
    }

    fn node_mut(&mut self, id: BranchNodeId) -> &mut BranchNode {
        &mut self.nodes[id.0 as usize]
    }

    /// Root-to-`id` clamp path, root-first.
    fn path_of(&self, id: BranchNodeId) -> Vec<BranchNodeId> {
        let mut path = Vec::new();
        let mut cur = Some(id);
        while let Some(nid) = cur {
            let n = self.node(nid);
            if n.parent.is_none() {
                break;
            }
            path.push(nid);
            cur = n.parent;
        }
        path.reverse();
        path
    }

    fn clamps_of(&self, path: &[BranchNodeId]) -> Vec<Clamp> {
        path.iter()
            .map(|&id| {
                let n = self.node(id);
                (n.edge.0, n.edge.1, n.direction)
            })
            .collect()
    }

    /// Runs the best-first search from `ctx`'s current (root) LP state, which must already be a
    /// `Frac` pivot result the caller obtained from `cutting_loop`.
    pub fn run(&mut self, ctx: &mut SolverContext, budget: &NodeBudget) -> SolveResult<BranchOutcome> {
        let root_estimate = Distance(ctx.core.objective().ceil() as i64);
        self.node_mut(BranchNodeId(0)).lp_estimate = root_estimate;
        self.frontier.push((Reverse(root_estimate), 0, 0));

        let mut visited_count = 0usize;
        while let Some((_, _, id_raw)) = self.frontier.pop() {
            if let Some(max) = budget.max_nodes {
                if visited_count >= max {
                    return Ok(BranchOutcome::BudgetExpired);
                }
            }
            let id = BranchNodeId(id_raw);
            if !matches!(self.node(id).status, NodeStatus::Unvisited) {
                continue;
            }
            if self.node(id).lp_estimate >= ctx.best_length() {
                self.node_mut(id).status = NodeStatus::Pruned;
                continue;
            }

            visited_count += 1;
            self.visit(ctx, id)?;
        }

        Ok(BranchOutcome::Exhausted)
    }

    fn visit(&mut self, ctx: &mut SolverContext, id: BranchNodeId) -> SolveResult<()> {
        let target_path = self.path_of(id);
        self.transition_clamps(ctx, &target_path)?;

        let tour_nodes = self
            .node(id)
            .tour_nodes
            .clone()
            .expect("a node only enters the frontier once its branch tour has been computed");
        install_tour(ctx, tour_nodes)?;

        debug!("visiting branch node {} at depth {}", id.0, self.node(id).depth);
        let do_price = ctx.pricing_enabled;
        let piv = cutting_loop(ctx, do_price, false)?;
        self.node_mut(id).status = NodeStatus::Visited;

        match piv {
            PivType::FathomedTour | PivType::Tour => {
                let tour = ctx.core.active_tour().clone();
                if ctx.offer_tour(tour) {
                    info!(
                        "branch node {} fathomed with an improving tour, length {:?}",
                        id.0,
                        ctx.best_length()
                    );
                }
                self.node_mut(id).status = NodeStatus::OptOptimized;
            }
            PivType::Frac | PivType::Subtour => {
                let estimate = Distance(ctx.core.objective().ceil() as i64);
                if estimate >= ctx.best_length() {
                    self.node_mut(id).status = NodeStatus::Pruned;
                } else {
                    self.split(ctx, id, estimate)?;
                }
            }
        }
        Ok(())
    }

    /// Produces the Up/Down children of `id`, computing each one's branch tour eagerly; a child
    /// whose branch tour cannot be built is pruned on the spot and never enters the frontier.
    fn split(&mut self, ctx: &mut SolverContext, id: BranchNodeId, parent_estimate: Distance) -> SolveResult<()> {
        let Some((candidate, down_obj, up_obj)) = strong_branch::select_branch_edge(&mut ctx.core)? else {
            self.node_mut(id).status = NodeStatus::Pruned;
            return Ok(());
        };
        // A probe that reported no feasible objective within its iteration budget isn't a
        // certificate of infeasibility (the budget may simply have run out), so such a child still
        // gets a chance via `branch_tour::compute_tour`; it just inherits the parent's estimate
        // instead of a tighter probed one.
        let probed_estimate = |probe: Option<f64>| match probe {
            Some(obj) => Distance(obj.ceil() as i64).max(parent_estimate),
            None => parent_estimate,
        };

        let n = ctx.instance.dimension();
        for (direction, ntype, estimate) in [
            (Direction::Up, NType::Left, probed_estimate(up_obj)),
            (Direction::Down, NType::Right, probed_estimate(down_obj)),
        ] {
            let child_id = BranchNodeId(self.nodes.len() as u32);
            let parent = self.node(id).clone();
            let mut child = BranchNode::child(child_id, &parent, candidate.edge, direction, ntype, estimate);

            let mut clamps = self.clamps_of(&self.path_of(id));
            clamps.push((candidate.edge.0, candidate.edge.1, direction));

            if branch_tour::obviously_infeasible(n, &clamps) {
                child.status = NodeStatus::Pruned;
                self.nodes.push(child);
                continue;
            }

            let tour_nodes = if branch_tour::is_compliant(&ctx.best_tour, &clamps) {
                Some(ctx.best_tour.nodes().to_vec())
            } else {
                branch_tour::compute_tour(&ctx.instance, n, &clamps)
            };

            match tour_nodes {
                Some(nodes) => {
                    child.tour_nodes = Some(nodes);
                    self.nodes.push(child);
                    self.frontier.push((Reverse(estimate), child.depth, child_id.0));
                }
                None => {
                    child.status = NodeStatus::Pruned;
                    self.nodes.push(child);
                }
            }
        }
        Ok(())
    }

    /// Walks `ctx.core`'s installed branch clamps from `current_path` to `target_path`: pops the
    /// suffix below their common ancestor (LIFO, `remove_last_row`), then pushes the new suffix in
    /// root-to-target order (`add_branch_cut`).
    fn transition_clamps(&mut self, ctx: &mut SolverContext, target_path: &[BranchNodeId]) -> SolveResult<()> {
        let common = self
            .current_path
            .iter()
            .zip(target_path.iter())
            .take_while(|(a, b)| a == b)
            .count();

        for _ in common..self.current_path.len() {
            ctx.core.remove_last_row()?;
        }
        self.current_path.truncate(common);

        for &id in &target_path[common..] {
            let n = self.node(id);
            ctx.core.add_branch_cut(n.edge, n.direction, &ctx.cliques, &ctx.teeth)?;
            self.current_path.push(id);
        }
        Ok(())
    }
}

impl Default for BranchController {
    fn default() -> Self {
        Self::new()
    }
}

fn install_tour(ctx: &mut SolverContext, nodes: Vec<tsp_core::node::Node>) -> SolveResult<()> {
    let n = nodes.len();
    let missing: Vec<Edge> = (0..n)
        .filter_map(|i| {
            let (u, v) = (nodes[i], nodes[(i + 1) % n]);
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
    let tour = Tour::from_nodes(nodes, ctx.core.graph())
        .ok_or_else(|| tsp_core::error::SolveError::invariant("branch tour is not a Hamiltonian cycle over CoreGraph"))?;
    ctx.set_active_tour(tour)
}
