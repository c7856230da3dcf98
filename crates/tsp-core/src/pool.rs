//! Long-lived cut storage for reuse across pivots, and the in-LP row-aging bookkeeping that
//! decides which rows are candidates for pruning.

use crate::{cut::HyperGraph, node::Node};

/// What an in-LP row actually is: either one of the `n` degree equations (never pruned, never
/// pooled) or a reference to a `HyperGraph` cut descriptor.
#[derive(Debug, Clone)]
pub enum RowRef {
    DegreeEquation(Node),
    Cut(HyperGraph),
}

#[derive(Debug, Clone)]
pub struct RowMeta {
    pub reference: RowRef,
    /// Consecutive pivots with nonzero slack or (near-)zero dual.
    pub age: u32,
}

impl RowMeta {
    pub fn degree(node: Node) -> Self {
        Self {
            reference: RowRef::DegreeEquation(node),
            age: 0,
        }
    }

    pub fn cut(cut: HyperGraph) -> Self {
        Self {
            reference: RowRef::Cut(cut),
            age: 0,
        }
    }

    pub fn is_exempt_from_aging(&self) -> bool {
        match &self.reference {
            RowRef::DegreeEquation(_) => true,
            RowRef::Cut(hg) => matches!(
                hg.cut_type(),
                crate::cut::CutType::Subtour | crate::cut::CutType::Branch
            ),
        }
    }

    /// Advances `age` by the pivot's slack/dual status; resets on a tight, dual-active row.
    pub fn tick(&mut self, slack_nonzero: bool, dual_near_zero: bool) {
        if self.is_exempt_from_aging() {
            return;
        }
        if slack_nonzero || dual_near_zero {
            self.age += 1;
        } else {
            self.age = 0;
        }
    }
}

/// Long-lived collection of [`HyperGraph`] cuts not currently in the LP, kept around for
/// re-separation. Unbounded capacity; re-pricing only scans the first `pool_scan_cap` entries per
/// call to cap cost.
#[derive(Debug, Default)]
pub struct CutPool {
    entries: Vec<HyperGraph>,
}

impl CutPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, cut: HyperGraph) {
        self.entries.push(cut);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The first `pool_scan_cap` entries, for re-pricing.
    pub fn scan_window(&self, pool_scan_cap: usize) -> &[HyperGraph] {
        let end = pool_scan_cap.min(self.entries.len());
        &self.entries[..end]
    }

    pub fn all(&self) -> &[HyperGraph] {
        &self.entries
    }

    /// Removes and returns the entries at the given indices (used when a re-priced cut is
    /// promoted back into the LP).
    pub fn remove_indices(&mut self, mut indices: Vec<usize>) -> Vec<HyperGraph> {
        indices.sort_unstable();
        indices.dedup();
        let mut removed = Vec::with_capacity(indices.len());
        for &index in indices.iter().rev() {
            removed.push(self.entries.remove(index));
        }
        removed.reverse();
        removed
    }
}

pub const DEFAULT_CUT_AGE_MAX: u32 = 100;
pub const DEFAULT_POOL_SCAN_CAP: usize = 500;
