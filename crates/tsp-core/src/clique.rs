//! Tour-relative, deduplicated representation of node subsets ("handles") referenced by cuts.
//!
//! A [`Clique`] is an unordered node set represented as a sorted disjoint union of tour-position
//! segments `[lo, hi]`. Two cliques are equal iff their segment lists, under the bank's current
//! defining tour, are equal. On tour augmentation the bank's defining tour changes and every
//! clique is re-expressed against the new tour (same node set, rebuilt segments) by
//! [`CliqueBank::rebase`].

use std::collections::HashMap;

use crate::{node::Node, tour::Tour};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CliqueHandle(pub u32);

/// An inclusive range of tour positions, `lo <= hi`, not wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Segment {
    pub lo: usize,
    pub hi: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Clique {
    /// Sorted, pairwise-disjoint, non-adjacent segments of tour positions.
    segments: Vec<Segment>,
}

impl Clique {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn node_count(&self, n: usize) -> usize {
        let _ = n;
        self.segments.iter().map(|s| s.hi - s.lo + 1).sum()
    }

    /// Expands the clique's node set against `tour`, in tour order.
    pub fn expand(&self, tour: &Tour) -> Vec<Node> {
        let nodes = tour.nodes();
        self.segments
            .iter()
            .flat_map(|seg| (seg.lo..=seg.hi).map(|pos| nodes[pos]))
            .collect()
    }

    /// Builds the canonical (sorted, merged) segment representation for a node set under `tour`.
    fn build_segments(nodes: &[Node], tour: &Tour) -> Vec<Segment> {
        let mut positions: Vec<usize> = nodes.iter().map(|&n| tour.position_of(n)).collect();
        positions.sort_unstable();
        positions.dedup();

        let mut segments = Vec::new();
        let mut iter = positions.into_iter();
        if let Some(first) = iter.next() {
            let mut lo = first;
            let mut hi = first;
            for pos in iter {
                if pos == hi + 1 {
                    hi = pos;
                } else {
                    segments.push(Segment { lo, hi });
                    lo = pos;
                    hi = pos;
                }
            }
            segments.push(Segment { lo, hi });
        }
        segments
    }
}

/// Reference-counted hash set of [`Clique`]s, shared by every `HyperGraph` row that references a
/// subtour/comb handle/tooth-root-body.
#[derive(Debug, Default)]
pub struct CliqueBank {
    cliques: Vec<Clique>,
    refcounts: Vec<u32>,
    index: HashMap<Clique, CliqueHandle>,
    free_list: Vec<u32>,
}

impl CliqueBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a node set under `tour`, bumping its reference count. Cliques are deduplicated:
    /// two calls with node sets producing the same segment list return the same handle.
    pub fn intern(&mut self, nodes: &[Node], tour: &Tour) -> CliqueHandle {
        let segments = Clique::build_segments(nodes, tour);
        let clique = Clique { segments };
        if let Some(&handle) = self.index.get(&clique) {
            self.refcounts[handle.0 as usize] += 1;
            return handle;
        }

        let handle = if let Some(reused) = self.free_list.pop() {
            self.cliques[reused as usize] = clique.clone();
            self.refcounts[reused as usize] = 1;
            CliqueHandle(reused)
        } else {
            let id = self.cliques.len() as u32;
            self.cliques.push(clique.clone());
            self.refcounts.push(1);
            CliqueHandle(id)
        };
        self.index.insert(clique, handle);
        handle
    }

    pub fn get(&self, handle: CliqueHandle) -> &Clique {
        &self.cliques[handle.0 as usize]
    }

    pub fn incref(&mut self, handle: CliqueHandle) {
        self.refcounts[handle.0 as usize] += 1;
    }

    /// Drops one reference; frees the slot (and its dedup-index entry) if it reaches zero.
    pub fn decref(&mut self, handle: CliqueHandle) {
        let count = &mut self.refcounts[handle.0 as usize];
        debug_assert!(*count > 0);
        *count -= 1;
        if *count == 0 {
            let clique = self.cliques[handle.0 as usize].clone();
            self.index.remove(&clique);
            self.free_list.push(handle.0);
        }
    }

    /// Re-expresses every still-referenced clique's node set against `new_tour`. Called once,
    /// right after `BestTour` is replaced on augmentation.
    pub fn rebase(&mut self, old_tour: &Tour, new_tour: &Tour) {
        let mut new_index = HashMap::new();
        for (slot, refcount) in self.refcounts.iter().enumerate() {
            if *refcount == 0 {
                continue;
            }
            let nodes = self.cliques[slot].expand(old_tour);
            let rebuilt = Clique {
                segments: Clique::build_segments(&nodes, new_tour),
            };
            new_index.insert(rebuilt.clone(), CliqueHandle(slot as u32));
            self.cliques[slot] = rebuilt;
        }
        self.index = new_index;
    }

    pub fn len(&self) -> usize {
        self.cliques.len() - self.free_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{distance::Distance, graph::{CoreGraph, Edge}};

    fn cyclic_tour(n: usize) -> (CoreGraph, Tour) {
        let mut g = CoreGraph::new(n);
        let edges: Vec<Edge> = (0..n)
            .map(|i| Edge::new(Node(i), Node((i + 1) % n), Distance(1)))
            .collect();
        g.append_edges(edges);
        let nodes = (0..n).map(Node).collect();
        let tour = Tour::from_nodes(nodes, &g).unwrap();
        (g, tour)
    }

    #[test]
    fn intern_dedupes_equal_node_sets() {
        let (_, tour) = cyclic_tour(8);
        let mut bank = CliqueBank::new();
        let h1 = bank.intern(&[Node(1), Node(2), Node(3)], &tour);
        let h2 = bank.intern(&[Node(3), Node(2), Node(1)], &tour);
        assert_eq!(h1, h2);
        assert_eq!(bank.get(h1).expand(&tour), vec![Node(1), Node(2), Node(3)]);
    }

    #[test]
    fn rebase_preserves_node_set_under_new_tour() {
        let (_, tour_a) = cyclic_tour(6);
        let mut bank = CliqueBank::new();
        let handle = bank.intern(&[Node(0), Node(1), Node(2)], &tour_a);

        // A different cyclic order of the same nodes/edges (rotation), still valid for this graph.
        let mut g2 = CoreGraph::new(6);
        let edges: Vec<Edge> = (0..6)
            .map(|i| Edge::new(Node(i), Node((i + 1) % 6), Distance(1)))
            .collect();
        g2.append_edges(edges);
        let tour_b = Tour::from_nodes(
            vec![Node(2), Node(3), Node(4), Node(5), Node(0), Node(1)],
            &g2,
        )
        .unwrap();

        bank.rebase(&tour_a, &tour_b);
        let mut expanded = bank.get(handle).expand(&tour_b);
        expanded.sort();
        assert_eq!(expanded, vec![Node(0), Node(1), Node(2)]);
    }

    #[test]
    fn decref_to_zero_frees_slot_for_reuse() {
        let (_, tour) = cyclic_tour(8);
        let mut bank = CliqueBank::new();
        let h1 = bank.intern(&[Node(0), Node(1)], &tour);
        bank.decref(h1);
        assert_eq!(bank.len(), 0);
        let h2 = bank.intern(&[Node(4), Node(5)], &tour);
        assert_eq!(h2.0, h1.0);
    }
}
