/*!
Primal cutting-plane separation, the cut-and-piv and pure-cut drivers, edge pricing, and the
augment-branch-cut controller for the symmetric TSP. `tsp-core` owns the data this crate operates
on (instances, the active edge set, cut descriptors, the branch tree's node bookkeeping); this
crate owns the control flow and the one stateful collaborator each routine needs from
[`tsp_lp::LpSolver`].

[`context::SolverContext`] is the single owner a caller constructs and then drives through
[`pure_cut::cutting_loop`] and, on a stubborn fractional solution, [`branch::BranchController`].
*/

pub mod branch;
pub mod context;
pub mod corelp;
pub mod cut_and_piv;
pub mod error;
pub mod karp_partition;
pub mod mincut;
pub mod pricer;
pub mod pure_cut;
pub mod separators;
pub mod support_graph;
pub mod xtour;

pub use context::{CutSelectionPreset, SolverContext};
pub use corelp::{CoreLP, PivType};
