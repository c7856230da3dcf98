//! Branch-tour feasibility and construction: given the accumulated Up/Down edge clamps
//! along a root-to-node path, either reuse the incumbent (if already compliant) or build a fresh
//! tour honoring every clamp via a constrained variant of the greedy/2-opt construction in
//! [`crate::xtour`].

use std::collections::{HashMap, HashSet};

use tsp_core::{branch::Direction, distance::Distance, instance::Instance, node::Node, tour::Tour};

use crate::separators::blossom::UnionFind;

/// One accumulated clamp: `(u, v)` forced present (`Up`) or forced absent (`Down`).
pub type Clamp = (Node, Node, Direction);

/// Cheap necessary-condition check, done before attempting construction: a node with more than
/// two Up-clamped incident edges, or a node all of whose (currently present) incident edges are
/// Down-clamped, cannot possibly be completed into a tour.
pub fn obviously_infeasible(n: usize, clamps: &[Clamp]) -> bool {
    let mut up_count = vec![0u8; n];
    let mut down_count = vec![0u8; n];
    for &(u, v, dir) in clamps {
        match dir {
            Direction::Up => {
                up_count[u.0] += 1;
                up_count[v.0] += 1;
            }
            Direction::Down => {
                down_count[u.0] += 1;
                down_count[v.0] += 1;
            }
        }
    }
    if up_count.iter().any(|&c| c > 2) {
        return true;
    }
    // A node fully boxed in by Down clamps on both sides of its only two incident edges is also
    // infeasible, but that needs the live adjacency list to check; the caller (which holds the
    // CoreGraph) is expected to add that check. Here we only catch the clamp-local case: a node
    // Down-clamped away from every edge it has an Up clamp compatible with.
    up_count
        .iter()
        .zip(down_count.iter())
        .any(|(&up, &down)| up == 0 && down >= 3)
}

/// Whether `tour` already satisfies every clamp (every Up edge present, every Down edge absent).
pub fn is_compliant(tour: &Tour, clamps: &[Clamp]) -> bool {
    clamps.iter().all(|&(u, v, dir)| {
        let present = tour.next(u) == v || tour.prev(u) == v;
        match dir {
            Direction::Up => present,
            Direction::Down => !present,
        }
    })
}

/// Builds a Hamiltonian cycle honoring every clamp, or `None` if no compliant tour could be
/// constructed. Not a certificate of infeasibility: this is a bounded heuristic, not an exact
/// search, so a `None` here means "give up and treat as infeasible for this node", matching the
/// pruning behavior the branch controller wants on construction failure.
pub fn compute_tour(instance: &Instance, n: usize, clamps: &[Clamp]) -> Option<Vec<Node>> {
    let forbidden: HashSet<(Node, Node)> = clamps
        .iter()
        .filter(|&&(_, _, dir)| dir == Direction::Down)
        .map(|&(u, v, _)| canon(u, v))
        .collect();
    let required: Vec<(Node, Node)> = clamps
        .iter()
        .filter(|&&(_, _, dir)| dir == Direction::Up)
        .map(|&(u, v, _)| canon(u, v))
        .collect();

    let mut degree = vec![0u8; n];
    let mut uf = UnionFind::new(n);
    let mut adjacency: Vec<Vec<Node>> = vec![Vec::new(); n];

    for &(u, v) in &required {
        if degree[u.0] >= 2 || degree[v.0] >= 2 || uf.find(u.0) == uf.find(v.0) {
            return None;
        }
        link(&mut degree, &mut uf, &mut adjacency, u, v);
    }

    // Greedily close out remaining degree with nearest-neighbor joins, skipping Down edges.
    loop {
        let open: Vec<usize> = (0..n).filter(|&i| degree[i] < 2).collect();
        if open.len() <= 1 {
            break;
        }
        let anchor = open[0];
        let mut best = None;
        let mut best_len = Distance::MAX;
        for &candidate in &open[1..] {
            if forbidden.contains(&canon(Node(anchor), Node(candidate))) {
                continue;
            }
            let same_component = uf.find(anchor) == uf.find(candidate);
            if same_component && open.len() > 2 {
                continue;
            }
            let len = instance.length(Node(anchor), Node(candidate));
            if len < best_len {
                best_len = len;
                best = Some(candidate);
            }
        }
        let Some(partner) = best else {
            // Every remaining pairing is Down-forbidden or would close early: construction fails.
            if open.len() == 2 && !forbidden.contains(&canon(Node(open[0]), Node(open[1]))) {
                link(&mut degree, &mut uf, &mut adjacency, Node(open[0]), Node(open[1]));
                continue;
            }
            return None;
        };
        link(&mut degree, &mut uf, &mut adjacency, Node(anchor), Node(partner));
    }

    let tour = walk_cycle(n, &adjacency)?;
    Some(constrained_two_opt(instance, tour, &forbidden, &required))
}

fn canon(u: Node, v: Node) -> (Node, Node) {
    if u.0 <= v.0 {
        (u, v)
    } else {
        (v, u)
    }
}

fn link(degree: &mut [u8], uf: &mut UnionFind, adjacency: &mut [Vec<Node>], u: Node, v: Node) {
    uf.union(u.0, v.0);
    degree[u.0] += 1;
    degree[v.0] += 1;
    adjacency[u.0].push(v);
    adjacency[v.0].push(u);
}

fn walk_cycle(n: usize, adjacency: &[Vec<Node>]) -> Option<Vec<Node>> {
    let mut visited = HashMap::with_capacity(n);
    let mut tour = Vec::with_capacity(n);
    let mut prev = None;
    let mut current = Node(0);
    for _ in 0..n {
        tour.push(current);
        visited.insert(current, true);
        let next = adjacency[current.0]
            .iter()
            .find(|&&cand| Some(cand) != prev && !visited.contains_key(&cand));
        prev = Some(current);
        match next {
            Some(&nxt) => current = nxt,
            None => break,
        }
    }
    if tour.len() == n {
        Some(tour)
    } else {
        None
    }
}

const MAX_TWO_OPT_PASSES: usize = 25;

/// Bounded 2-opt that only performs a swap when it touches no Up-required edge and introduces no
/// Down-forbidden edge.
fn constrained_two_opt(
    instance: &Instance,
    mut tour: Vec<Node>,
    forbidden: &HashSet<(Node, Node)>,
    required: &[(Node, Node)],
) -> Vec<Node> {
    let n = tour.len();
    if n < 4 {
        return tour;
    }
    let required: HashSet<(Node, Node)> = required.iter().copied().collect();
    for _ in 0..MAX_TWO_OPT_PASSES {
        let mut improved = false;
        for i in 0..n - 1 {
            for j in (i + 2)..n {
                if i == 0 && j == n - 1 {
                    continue;
                }
                let (a, b, c, d) = (tour[i], tour[i + 1], tour[j], tour[(j + 1) % n]);
                if required.contains(&canon(a, b)) || required.contains(&canon(c, d)) {
                    continue;
                }
                if forbidden.contains(&canon(a, c)) || forbidden.contains(&canon(b, d)) {
                    continue;
                }
                let before = instance.length(a, b) + instance.length(c, d);
                let after = instance.length(a, c) + instance.length(b, d);
                if after < before {
                    tour[i + 1..=j].reverse();
                    improved = true;
                }
            }
        }
        if !improved {
            break;
        }
    }
    tour
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsp_core::{
        graph::{CoreGraph, Edge},
        instance::{EdgeWeightType, InstanceMetadata, NodeCoordType, ProblemType},
        matrix::MatrixSym,
    };

    fn square_instance() -> (Instance, CoreGraph) {
        let n = 4;
        let coords = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
        let lengths = MatrixSym::slow_new_from_fn(n, |a, b| {
            let (ax, ay) = coords[a.0];
            let (bx, by) = coords[b.0];
            Distance((((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()).round() as i64)
        });
        let metadata = InstanceMetadata {
            name: "square".into(),
            problem_type: ProblemType::Tsp,
            comment: None,
            dimension: n,
            edge_weight_type: EdgeWeightType::Euc2D,
            edge_weight_format: None,
            node_coord_type: NodeCoordType::TwoDCoords,
            coords: Some(coords.to_vec()),
        };
        let instance = Instance::new(metadata, lengths);
        let mut g = CoreGraph::new(n);
        g.append_edges([
            Edge::new(Node(0), Node(1), instance.length(Node(0), Node(1))),
            Edge::new(Node(1), Node(2), instance.length(Node(1), Node(2))),
            Edge::new(Node(2), Node(3), instance.length(Node(2), Node(3))),
            Edge::new(Node(3), Node(0), instance.length(Node(3), Node(0))),
        ]);
        (instance, g)
    }

    #[test]
    fn respects_an_up_clamp_and_a_down_clamp() {
        let (instance, _g) = square_instance();
        let clamps = vec![
            (Node(0), Node(1), Direction::Up),
            (Node(0), Node(2), Direction::Down),
        ];
        let tour = compute_tour(&instance, 4, &clamps).expect("should find a compliant tour");
        assert!(tour.iter().copied().collect::<HashSet<_>>().len() == 4);
        let pos: HashMap<Node, usize> = tour.iter().enumerate().map(|(i, &n)| (n, i)).collect();
        let adjacent = |a: Node, b: Node| {
            let (pa, pb) = (pos[&a], pos[&b]);
            (pa + 1) % 4 == pb || (pb + 1) % 4 == pa
        };
        assert!(adjacent(Node(0), Node(1)));
        assert!(!adjacent(Node(0), Node(2)));
    }

    #[test]
    fn three_up_clamps_on_one_node_is_obviously_infeasible() {
        let clamps = vec![
            (Node(0), Node(1), Direction::Up),
            (Node(0), Node(2), Direction::Up),
            (Node(0), Node(3), Direction::Up),
        ];
        assert!(obviously_infeasible(4, &clamps));
    }
}
