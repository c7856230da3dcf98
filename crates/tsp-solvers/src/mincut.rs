//! Minimum s-t cut (BFS-augmenting-path max-flow) and the Gomory-Hu tree (Gusfield's
//! all-pairs-via-n-1-max-flows construction), over a small dense capacitated graph. Used by the
//! exact-blossom and simple-domino-parity separators, never by the LP-scale pivot loop.

use std::collections::VecDeque;

use tsp_core::distance::EPSILON;

/// A small dense undirected capacitated graph (witness graphs stay within a few hundred nodes).
#[derive(Debug, Clone)]
pub struct CapacityGraph {
    n: usize,
    cap: Vec<f64>,
}

impl CapacityGraph {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            cap: vec![0.0; n * n],
        }
    }

    pub fn node_count(&self) -> usize {
        self.n
    }

    #[inline]
    fn index(&self, u: usize, v: usize) -> usize {
        u * self.n + v
    }

    /// Accumulates capacity on edge `(u, v)` (parallel edges sum).
    pub fn add_edge(&mut self, u: usize, v: usize, capacity: f64) {
        debug_assert!(u != v);
        let a = self.index(u, v);
        let b = self.index(v, u);
        self.cap[a] += capacity;
        self.cap[b] += capacity;
    }

    pub fn capacity(&self, u: usize, v: usize) -> f64 {
        self.cap[self.index(u, v)]
    }
}

pub struct MinCutResult {
    pub value: f64,
    /// `true` for nodes on the source side of the minimum cut.
    pub source_side: Vec<bool>,
}

/// Max-flow / min-cut via repeated BFS augmenting paths (Edmonds-Karp) on a residual copy of
/// `graph`'s capacity matrix.
pub fn min_st_cut(graph: &CapacityGraph, s: usize, t: usize) -> MinCutResult {
    let n = graph.node_count();
    let mut residual = graph.cap.clone();
    let index = |u: usize, v: usize| u * n + v;

    loop {
        let mut parent = vec![usize::MAX; n];
        parent[s] = s;
        let mut queue = VecDeque::from([s]);
        while let Some(u) = queue.pop_front() {
            if u == t {
                break;
            }
            for v in 0..n {
                if parent[v] == usize::MAX && residual[index(u, v)] > EPSILON {
                    parent[v] = u;
                    queue.push_back(v);
                }
            }
        }
        if parent[t] == usize::MAX {
            break;
        }

        let mut bottleneck = f64::INFINITY;
        let mut v = t;
        while v != s {
            let u = parent[v];
            bottleneck = bottleneck.min(residual[index(u, v)]);
            v = u;
        }
        let mut v = t;
        while v != s {
            let u = parent[v];
            residual[index(u, v)] -= bottleneck;
            residual[index(v, u)] += bottleneck;
            v = u;
        }
    }

    let mut source_side = vec![false; n];
    source_side[s] = true;
    let mut queue = VecDeque::from([s]);
    while let Some(u) = queue.pop_front() {
        for v in 0..n {
            if !source_side[v] && residual[index(u, v)] > EPSILON {
                source_side[v] = true;
                queue.push_back(v);
            }
        }
    }

    let value = (0..n)
        .filter(|&u| source_side[u])
        .flat_map(|u| (0..n).map(move |v| (u, v)))
        .filter(|&(u, v)| !source_side[v])
        .map(|(u, v)| graph.capacity(u, v))
        .sum();

    MinCutResult { value, source_side }
}

/// A Gomory-Hu tree: `parent[i]` is `i`'s parent (root is its own parent), `weight[i]` the cut
/// value of the tree edge `(i, parent[i])`.
pub struct GomoryHuTree {
    pub parent: Vec<usize>,
    pub weight: Vec<f64>,
}

impl GomoryHuTree {
    /// The node sets on either side of tree edge `i` (`i != root`), as a boolean "side of `i`"
    /// mask over all `n` nodes, computed by removing the tree edge and flood-filling.
    pub fn cut_side(&self, edge_node: usize) -> Vec<bool> {
        let n = self.parent.len();
        let mut adjacency = vec![Vec::new(); n];
        for (node, &parent) in self.parent.iter().enumerate() {
            if node != parent {
                adjacency[node].push(parent);
                adjacency[parent].push(node);
            }
        }
        let mut side = vec![false; n];
        side[edge_node] = true;
        let mut queue = VecDeque::from([edge_node]);
        let blocked_parent = self.parent[edge_node];
        while let Some(u) = queue.pop_front() {
            for &v in &adjacency[u] {
                if u == edge_node && v == blocked_parent {
                    continue;
                }
                if v == edge_node && u == blocked_parent {
                    continue;
                }
                if !side[v] {
                    side[v] = true;
                    queue.push_back(v);
                }
            }
        }
        side
    }
}

/// Gusfield's simplification of Gomory-Hu: `n-1` max-flow calls instead of `n-1` graph
/// contractions, same resulting tree weights.
pub fn gomory_hu_tree(graph: &CapacityGraph) -> GomoryHuTree {
    let n = graph.node_count();
    let mut parent = vec![0usize; n];
    let mut weight = vec![0.0; n];

    for i in 1..n {
        let cut = min_st_cut(graph, i, parent[i]);
        weight[i] = cut.value;
        for j in (i + 1)..n {
            if parent[j] == parent[i] && cut.source_side[j] {
                parent[j] = i;
            }
        }
    }

    GomoryHuTree { parent, weight }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_cut_on_bridge_graph() {
        // 0-1-2-3 path with a bottleneck edge (1,2) of capacity 1, others capacity 5.
        let mut g = CapacityGraph::new(4);
        g.add_edge(0, 1, 5.0);
        g.add_edge(1, 2, 1.0);
        g.add_edge(2, 3, 5.0);
        let cut = min_st_cut(&g, 0, 3);
        assert!((cut.value - 1.0).abs() < 1e-6);
        assert!(cut.source_side[0] && cut.source_side[1]);
        assert!(!cut.source_side[2] && !cut.source_side[3]);
    }

    #[test]
    fn gomory_hu_reproduces_pairwise_min_cuts() {
        let mut g = CapacityGraph::new(4);
        g.add_edge(0, 1, 5.0);
        g.add_edge(1, 2, 1.0);
        g.add_edge(2, 3, 5.0);
        let tree = gomory_hu_tree(&g);
        // Every tree edge weight must equal the direct min-cut between its endpoints.
        for node in 1..4 {
            let direct = min_st_cut(&g, node, tree.parent[node]).value;
            assert!((direct - tree.weight[node]).abs() < 1e-6);
        }
    }
}
