//! Simple teeth: `(root, body)` pairs where `body` is a contiguous tour segment excluding `root`,
//! representing the inequality `2x(E(body)) + x(E(root:body)) <= 2|body| - 1`.
//!
//! `body` is stored as a [`Segment`] of positions *relative to `root`'s own tour position*
//! (`1..=n-1`, since a relative position of `0` would be `root` itself), rather than raw tour
//! positions: a body can legitimately wrap past position `n-1` back to `0` without ever wrapping
//! through `root`, which a raw, non-wrapping `[lo,hi]` range cannot represent directly. Rotating
//! into root-relative coordinates on the way in (and back out again in [`SimpleTooth::body_nodes`])
//! sidesteps that without needing a wrapping segment type.

use std::collections::HashMap;

use crate::{clique::Segment, node::Node, tour::Tour};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ToothHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToothType {
    /// `body` starts immediately after `root` in tour order.
    LeftAdjacent,
    /// `body` ends immediately before `root` in tour order.
    RightAdjacent,
    /// Neither endpoint of `body` is adjacent to `root`.
    Distant,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ToothKey {
    root_pos: usize,
    body: Segment,
}

#[derive(Debug, Clone)]
pub struct SimpleTooth {
    pub root: Node,
    /// Root-relative position range, `1 <= lo <= hi <= n-1`.
    body: Segment,
    root_pos: usize,
    pub slack: f64,
    pub tooth_type: ToothType,
}

impl SimpleTooth {
    pub fn body_size(&self) -> usize {
        self.body.hi - self.body.lo + 1
    }

    /// The stored root-relative segment; only meaningful together with `root`'s tour position.
    pub fn body_segment(&self) -> Segment {
        self.body
    }

    /// Body nodes in tour order (root excluded).
    pub fn body_nodes(&self, tour: &Tour) -> Vec<Node> {
        let n = tour.node_count();
        let nodes = tour.nodes();
        (self.body.lo..=self.body.hi)
            .map(|rel| nodes[(self.root_pos + rel) % n])
            .collect()
    }

    fn classify(body: Segment, n: usize) -> ToothType {
        if body.lo == 1 {
            ToothType::LeftAdjacent
        } else if body.hi == n - 1 {
            ToothType::RightAdjacent
        } else {
            ToothType::Distant
        }
    }
}

/// Reference-counted hash set of [`SimpleTooth`]es, mirroring [`CliqueBank`](crate::clique::CliqueBank).
#[derive(Debug, Default)]
pub struct ToothBank {
    teeth: Vec<SimpleTooth>,
    refcounts: Vec<u32>,
    index: HashMap<ToothKey, ToothHandle>,
    free_list: Vec<u32>,
}

impl ToothBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a `(root, body_nodes)` tooth under `tour`. `body_nodes` must be a nonempty,
    /// contiguous run of tour positions, in tour order, not including `root`; it may wrap past the
    /// last tour position back to the first, as long as it never passes through `root` itself.
    pub fn intern(&mut self, root: Node, body_nodes: &[Node], slack: f64, tour: &Tour) -> ToothHandle {
        let n = tour.node_count();
        let root_pos = tour.position_of(root);
        let body = Self::relative_segment(body_nodes, root_pos, tour);
        let (body, slack) = Self::canonicalize(body, slack, n);
        let key = ToothKey { root_pos, body };

        if let Some(&handle) = self.index.get(&key) {
            self.refcounts[handle.0 as usize] += 1;
            return handle;
        }

        let tooth_type = SimpleTooth::classify(body, n);
        let tooth = SimpleTooth {
            root,
            body,
            root_pos,
            slack,
            tooth_type,
        };

        let handle = if let Some(reused) = self.free_list.pop() {
            self.teeth[reused as usize] = tooth;
            self.refcounts[reused as usize] = 1;
            ToothHandle(reused)
        } else {
            let id = self.teeth.len() as u32;
            self.teeth.push(tooth);
            self.refcounts.push(1);
            ToothHandle(id)
        };
        self.index.insert(key, handle);
        handle
    }

    /// Maps absolute tour positions of `body_nodes` onto the `1..=n-1` range relative to
    /// `root_pos`, and collapses them to their `[lo,hi]` span (the caller guarantees contiguity).
    fn relative_segment(body_nodes: &[Node], root_pos: usize, tour: &Tour) -> Segment {
        let n = tour.node_count();
        let mut rel: Vec<usize> = body_nodes
            .iter()
            .map(|&node| (tour.position_of(node) + n - root_pos) % n)
            .collect();
        rel.sort_unstable();
        Segment {
            lo: *rel.first().expect("tooth body must not be empty"),
            hi: *rel.last().expect("tooth body must not be empty"),
        }
    }

    /// Complements `body` to the other side of `root` if that is strictly smaller, so that a
    /// tooth's body never exceeds half the tour when canonicalizing a left- or right-adjacent
    /// tooth. A distant tooth's complement would split into two disjoint arcs around `root` rather
    /// than one contiguous segment, so a distant body larger than half the tour is left as-is: a
    /// missed dedup opportunity, not a correctness problem (the row produced is still checked for
    /// violation/tightness independently).
    fn canonicalize(body: Segment, slack: f64, n: usize) -> (Segment, f64) {
        let body_size = body.hi - body.lo + 1;
        if body_size * 2 <= n - 1 {
            return (body, slack);
        }
        if body.lo == 1 {
            (Segment { lo: body.hi + 1, hi: n - 1 }, slack)
        } else if body.hi == n - 1 {
            (Segment { lo: 1, hi: body.lo - 1 }, slack)
        } else {
            (body, slack)
        }
    }

    pub fn get(&self, handle: ToothHandle) -> &SimpleTooth {
        &self.teeth[handle.0 as usize]
    }

    pub fn incref(&mut self, handle: ToothHandle) {
        self.refcounts[handle.0 as usize] += 1;
    }

    pub fn decref(&mut self, handle: ToothHandle) {
        let count = &mut self.refcounts[handle.0 as usize];
        debug_assert!(*count > 0);
        *count -= 1;
        if *count == 0 {
            let key = ToothKey {
                root_pos: self.teeth[handle.0 as usize].root_pos,
                body: self.teeth[handle.0 as usize].body,
            };
            self.index.remove(&key);
            self.free_list.push(handle.0);
        }
    }

    /// Re-expresses every still-referenced tooth's body against `new_tour`, mirroring
    /// [`CliqueBank::rebase`](crate::clique::CliqueBank::rebase): `root_pos` and the root-relative
    /// body span are both defined against one particular tour, so they must be rebuilt whenever
    /// the defining tour changes.
    pub fn rebase(&mut self, old_tour: &Tour, new_tour: &Tour) {
        let n = new_tour.node_count();
        let mut new_index = HashMap::new();
        for (slot, refcount) in self.refcounts.iter().enumerate() {
            if *refcount == 0 {
                continue;
            }
            let root = self.teeth[slot].root;
            let slack = self.teeth[slot].slack;
            let body_nodes = self.teeth[slot].body_nodes(old_tour);

            let root_pos = new_tour.position_of(root);
            let body = Self::relative_segment(&body_nodes, root_pos, new_tour);
            let (body, slack) = Self::canonicalize(body, slack, n);
            let tooth_type = SimpleTooth::classify(body, n);

            let key = ToothKey { root_pos, body };
            self.teeth[slot] = SimpleTooth {
                root,
                body,
                root_pos,
                slack,
                tooth_type,
            };
            new_index.insert(key, ToothHandle(slot as u32));
        }
        self.index = new_index;
    }

    pub fn len(&self) -> usize {
        self.teeth.len() - self.free_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
