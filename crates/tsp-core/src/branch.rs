//! ABC branch tree node bookkeeping.

use crate::{cut::BranchDirection, distance::Distance, node::Node};

pub use crate::cut::BranchDirection as Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NType {
    Root,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStatus {
    Unvisited,
    OptOptimized,
    Pruned,
    Visited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchNodeId(pub u32);

#[derive(Debug, Clone)]
pub struct BranchNode {
    pub id: BranchNodeId,
    pub parent: Option<BranchNodeId>,
    pub edge: (Node, Node),
    pub direction: Direction,
    pub depth: u32,
    pub ntype: NType,
    /// This node's feasible branch tour, once found. Stored as a plain node order rather than a
    /// `CliqueBank` handle: a `Clique` records a node subset against a defining tour's existing
    /// order, which cannot express a differently-ordered permutation of the same nodes.
    pub tour_nodes: Option<Vec<Node>>,
    pub lp_estimate: Distance,
    pub status: NodeStatus,
}

impl BranchNode {
    pub fn root() -> Self {
        Self {
            id: BranchNodeId(0),
            parent: None,
            edge: (Node(0), Node(0)),
            direction: Direction::Up,
            depth: 0,
            ntype: NType::Root,
            tour_nodes: None,
            lp_estimate: Distance::ZERO,
            status: NodeStatus::Unvisited,
        }
    }

    pub fn child(
        id: BranchNodeId,
        parent: &BranchNode,
        edge: (Node, Node),
        direction: Direction,
        ntype: NType,
        lp_estimate: Distance,
    ) -> Self {
        Self {
            id,
            parent: Some(parent.id),
            edge,
            direction,
            depth: parent.depth + 1,
            ntype,
            tour_nodes: None,
            lp_estimate,
            status: NodeStatus::Unvisited,
        }
    }
}
