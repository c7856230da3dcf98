//! Recursive geometric median-split partitioning of node coordinates into buckets of bounded
//! size, used to decompose simple-domino-parity separation.

use std::sync::Mutex;

use tsp_core::node::Node;

/// Splits `nodes` (paired with their coordinates) into parts of size `<= max_part_size`, by
/// recursively cutting on the median of the widest coordinate axis. Guarantees a partition, not a
/// cover: every node appears in exactly one part.
///
/// The first cut's two halves are built concurrently (`std::thread::scope`, results spliced back
/// together under a mutex); everything below that recurses sequentially, since coordinate data is
/// read-only and splitting is the only part of this separator's pipeline without a shared mutable
/// bank to serialize against.
pub fn karp_partition(coords: &[(f64, f64)], max_part_size: usize) -> Vec<Vec<Node>> {
    let all: Vec<Node> = (0..coords.len()).map(Node).collect();
    split_top(&all, coords, max_part_size.max(1))
}

/// `max_part_size` used by the solver's default preset: `ceil(4 * sqrt(n))`.
pub fn default_max_part_size(n: usize) -> usize {
    ((4.0 * (n as f64).sqrt()).ceil() as usize).max(1)
}

fn split_top(nodes: &[Node], coords: &[(f64, f64)], max_part_size: usize) -> Vec<Vec<Node>> {
    if nodes.len() <= max_part_size {
        return vec![nodes.to_vec()];
    }
    let (left, right) = bisect(nodes, coords);

    let collected: Mutex<Vec<(usize, Vec<Vec<Node>>)>> = Mutex::new(Vec::new());
    std::thread::scope(|scope| {
        for (tag, half) in [(0usize, &left), (1usize, &right)] {
            let collected = &collected;
            scope.spawn(move || {
                let parts = split(half, coords, max_part_size);
                collected.lock().unwrap().push((tag, parts));
            });
        }
    });

    let mut tagged = collected.into_inner().unwrap();
    tagged.sort_by_key(|&(tag, _)| tag);
    tagged.into_iter().flat_map(|(_, parts)| parts).collect()
}

fn split(nodes: &[Node], coords: &[(f64, f64)], max_part_size: usize) -> Vec<Vec<Node>> {
    if nodes.len() <= max_part_size {
        return vec![nodes.to_vec()];
    }
    let (left, right) = bisect(nodes, coords);
    let mut out = split(&left, coords, max_part_size);
    out.extend(split(&right, coords, max_part_size));
    out
}

fn bisect(nodes: &[Node], coords: &[(f64, f64)]) -> (Vec<Node>, Vec<Node>) {
    let (min_x, max_x, min_y, max_y) = bounding_box(nodes, coords);
    let axis_is_x = (max_x - min_x) >= (max_y - min_y);

    let mut sorted = nodes.to_vec();
    sorted.sort_by(|&a, &b| {
        let ka = if axis_is_x { coords[a.0].0 } else { coords[a.0].1 };
        let kb = if axis_is_x { coords[b.0].0 } else { coords[b.0].1 };
        ka.partial_cmp(&kb).unwrap()
    });

    let mid = sorted.len() / 2;
    (sorted[..mid].to_vec(), sorted[mid..].to_vec())
}

fn bounding_box(nodes: &[Node], coords: &[(f64, f64)]) -> (f64, f64, f64, f64) {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &node in nodes {
        let (x, y) = coords[node.0];
        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    (min_x, max_x, min_y, max_y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partitions_cover_every_node_exactly_once() {
        let coords: Vec<(f64, f64)> = (0..40).map(|i| (i as f64, (i * 7 % 13) as f64)).collect();
        let parts = karp_partition(&coords, default_max_part_size(40));
        let mut seen = vec![false; 40];
        for part in &parts {
            for node in part {
                assert!(!seen[node.0], "node visited twice");
                seen[node.0] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn respects_max_part_size() {
        let coords: Vec<(f64, f64)> = (0..100).map(|i| (i as f64, 0.0)).collect();
        let max_size = default_max_part_size(100);
        let parts = karp_partition(&coords, max_size);
        assert!(parts.iter().all(|p| p.len() <= max_size));
    }
}
