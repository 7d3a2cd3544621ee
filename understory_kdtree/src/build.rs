// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Balanced bulk build and rebuild.
//!
//! The builder picks, at each node, the item whose discriminating edge lies
//! closest to the mean of that edge over the partition, then splits the rest
//! with the same cyclic comparison insertion uses. Levels past the configured
//! depth cap are not built; their items are inserted one at a time afterwards.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;

use crate::config::KdConfig;
use crate::error::{FaultKind, KdError};
use crate::node::{HI, LO, Node, NodeIdx, is_far, next_disc};
use crate::tree::{KdTree, side_of};
use crate::types::{Aabb2D, Scalar, cmp_t, max_t, min_t, union_aabb};

/// An item waiting to be placed.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Staged<T, I> {
    pub(crate) item: I,
    pub(crate) bbox: Aabb2D<T>,
}

/// Items loaded for a build, with their extent and mean left edge.
#[derive(Debug)]
pub(crate) struct Staging<T, I> {
    pub(crate) items: Vec<Staged<T, I>>,
    pub(crate) extent: Option<Aabb2D<T>>,
    left_sum: f64,
}

impl<T: Scalar, I> Staging<T, I> {
    pub(crate) fn new() -> Self {
        Self {
            items: Vec::new(),
            extent: None,
            left_sum: 0.0,
        }
    }

    pub(crate) fn push(&mut self, item: I, bbox: Aabb2D<T>) {
        self.left_sum += bbox.min_x.to_f64();
        self.extent = Some(match self.extent {
            Some(e) => union_aabb(e, bbox),
            None => bbox,
        });
        self.items.push(Staged { item, bbox });
    }

    fn mean(&self) -> f64 {
        self.left_sum / self.items.len() as f64
    }
}

/// A partition waiting for its node.
struct Pending<T, I> {
    items: Vec<Staged<T, I>>,
    disc: usize,
    level: usize,
    mean: f64,
    parent: Option<(NodeIdx, usize)>,
}

impl<T: Scalar, I: Copy + PartialEq + Debug> KdTree<T, I> {
    /// Build a balanced tree from the given items with the default config.
    pub fn build(items: impl IntoIterator<Item = (I, Aabb2D<T>)>) -> Result<Self, KdError> {
        Self::build_with(KdConfig::default(), items)
    }

    /// Build a balanced tree from the given items.
    ///
    /// Fails with [`FaultKind::EmptyBuild`] when `items` is empty.
    pub fn build_with(
        config: KdConfig,
        items: impl IntoIterator<Item = (I, Aabb2D<T>)>,
    ) -> Result<Self, KdError> {
        let mut staging = Staging::new();
        for (item, bbox) in items {
            staging.push(item, bbox);
        }
        Self::from_staging(config, staging)
    }

    /// Build a balanced tree by pulling items from `next` until it returns
    /// `None`.
    pub fn build_from_fn(
        config: KdConfig,
        next: impl FnMut() -> Option<(I, Aabb2D<T>)>,
    ) -> Result<Self, KdError> {
        Self::build_with(config, core::iter::from_fn(next))
    }

    fn from_staging(config: KdConfig, staging: Staging<T, I>) -> Result<Self, KdError> {
        if staging.items.is_empty() {
            return Err(KdError::fault_of(FaultKind::EmptyBuild));
        }
        let mut tree = Self::with_config(config);
        tree.load(staging)?;
        Ok(tree)
    }

    /// Rebuild the tree in place from its live items.
    ///
    /// Tombstones are dropped and the bound fields and extent are recomputed,
    /// so this is the only operation that narrows them. Uses the current
    /// builder depth cap. A tree with no live items is only cleared.
    ///
    /// The new tree is built separately and swapped in on success; on a fault
    /// (such as a repeated item meeting itself while residual items are
    /// inserted) `self` is left exactly as it was.
    pub fn rebuild(&mut self) -> Result<(), KdError> {
        let mut staging = Staging::new();
        for (item, bbox) in self.items() {
            staging.push(item, bbox);
        }
        if staging.items.is_empty() {
            self.clear();
            return Ok(());
        }
        let mut fresh = Self::with_config(self.config);
        fresh.flip = self.flip;
        fresh.load(staging)?;
        *self = fresh;
        Ok(())
    }

    /// Place staged items into an empty tree.
    fn load(&mut self, staging: Staging<T, I>) -> Result<(), KdError> {
        let total = staging.items.len();
        let max_level = self.config.max_build_depth;
        let mean = staging.mean();
        self.extent = staging.extent;
        let residual = if max_level == 0 {
            staging.items
        } else {
            self.build_levels(staging.items, mean, max_level)?
        };
        self.items_balanced = total - residual.len();
        log::debug!(
            "kd build: {} items, {} balanced, {} spilled, depth cap {}",
            total,
            self.items_balanced,
            residual.len(),
            max_level
        );
        for s in residual {
            self.insert(s.item, s.bbox)?;
        }
        Ok(())
    }

    /// Build levels `1..=max_level`; returns the items left below the cap.
    fn build_levels(
        &mut self,
        items: Vec<Staged<T, I>>,
        mean: f64,
        max_level: usize,
    ) -> Result<Vec<Staged<T, I>>, KdError> {
        let mut spill = Vec::new();
        let mut work = vec![Pending {
            items,
            disc: 0,
            level: 1,
            mean,
            parent: None,
        }];
        while let Some(p) = work.pop() {
            let split = partition(p.items, p.disc, p.mean)?;
            let idx = self.nodes.alloc(split.node);
            self.item_count += 1;
            match p.parent {
                Some((parent, side)) => self.nodes[parent].sons[side] = Some(idx),
                None => self.root = Some(idx),
            }
            if p.level >= max_level {
                spill.extend(split.lo);
                spill.extend(split.hi);
                continue;
            }
            let nd = next_disc(p.disc);
            let sides = [(LO, split.lo, split.lo_mean), (HI, split.hi, split.hi_mean)];
            for (side, items, mean) in sides {
                if !items.is_empty() {
                    work.push(Pending {
                        items,
                        disc: nd,
                        level: p.level + 1,
                        mean,
                        parent: Some((idx, side)),
                    });
                }
            }
        }
        Ok(spill)
    }
}

struct Split<T, I> {
    node: Node<T, I>,
    lo: Vec<Staged<T, I>>,
    hi: Vec<Staged<T, I>>,
    lo_mean: f64,
    hi_mean: f64,
}

/// Pick the node for a partition and split the rest around it.
///
/// Bound fields are computed over the whole partition, so they hold even
/// when the sides are spilled instead of built.
fn partition<T: Scalar, I: Copy>(
    mut items: Vec<Staged<T, I>>,
    disc: usize,
    mean: f64,
) -> Result<Split<T, I>, KdError> {
    let Some(k) = nearest_to_mean(&items, disc, mean) else {
        return Err(KdError::fault_of(FaultKind::BadMedian));
    };
    let pivot = items.swap_remove(k);
    let mut node = Node::leaf(pivot.item, pivot.bbox, disc);
    let nd = next_disc(disc);
    let axis = disc & 1;
    let (mut lo, mut hi) = (Vec::new(), Vec::new());
    let (mut lo_sum, mut hi_sum) = (0.0, 0.0);
    for s in items {
        let side = side_of(&s.bbox, &pivot.bbox, disc);
        node.lo_min = min_t(node.lo_min, s.bbox.edge(axis));
        node.hi_max = max_t(node.hi_max, s.bbox.edge(axis + 2));
        if side == LO {
            if !is_far(disc) {
                node.other = max_t(node.other, s.bbox.edge(axis + 2));
            }
            lo_sum += s.bbox.edge(nd).to_f64();
            lo.push(s);
        } else {
            if is_far(disc) {
                node.other = min_t(node.other, s.bbox.edge(axis));
            }
            hi_sum += s.bbox.edge(nd).to_f64();
            hi.push(s);
        }
    }
    let lo_mean = if lo.is_empty() { 0.0 } else { lo_sum / lo.len() as f64 };
    let hi_mean = if hi.is_empty() { 0.0 } else { hi_sum / hi.len() as f64 };
    Ok(Split {
        node,
        lo,
        hi,
        lo_mean,
        hi_mean,
    })
}

/// Index of the first item whose discriminating edge is closest to `mean`.
fn nearest_to_mean<T: Scalar, I>(
    items: &[Staged<T, I>],
    disc: usize,
    mean: f64,
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, s) in items.iter().enumerate() {
        let d = s.bbox.edge(disc).to_f64() - mean;
        let d = if d < 0.0 { -d } else { d };
        match best {
            Some((_, bd)) if cmp_t(d, bd).is_ge() => {}
            _ => best = Some((i, d)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{brute_query, random_boxes};

    fn b(l: i32, bt: i32, r: i32, t: i32) -> Aabb2D<i32> {
        Aabb2D::new(l, bt, r, t)
    }

    #[test]
    fn empty_build_faults() {
        let err = KdTree::<i32, u32>::build(core::iter::empty()).unwrap_err();
        assert_eq!(err.fault().unwrap().kind(), FaultKind::EmptyBuild);
        assert_eq!(err.fault().unwrap().code(), 1);
    }

    #[test]
    fn build_places_every_item() {
        let items = random_boxes(7, 500);
        let tree = KdTree::build(items.iter().copied()).unwrap();
        assert_eq!(tree.count(), 500);
        assert_eq!(tree.items_balanced(), 500);
        for (item, bbox) in &items {
            assert!(tree.is_member(*item, bbox));
        }
        assert!(tree.check_bounds());
        let h = tree.health();
        assert!(h.balance_ratio < 3.0, "built tree should be shallow: {h}");
    }

    #[test]
    fn build_extent_covers_input() {
        let tree = KdTree::build([(1_u32, b(0, 0, 1, 1)), (2, b(-3, 4, 2, 8))]).unwrap();
        assert_eq!(tree.extent(), Some(b(-3, 0, 2, 8)));
    }

    #[test]
    fn depth_cap_zero_inserts_everything() {
        let items = random_boxes(3, 64);
        let tree = KdTree::build_with(KdConfig::with_max_build_depth(0), items.iter().copied())
            .unwrap();
        assert_eq!(tree.items_balanced(), 0);
        assert_eq!(tree.count(), 64);
        assert!(tree.check_bounds());
    }

    #[test]
    fn depth_cap_one_builds_only_root() {
        let items = random_boxes(4, 64);
        let tree = KdTree::build_with(KdConfig::with_max_build_depth(1), items.iter().copied())
            .unwrap();
        assert_eq!(tree.items_balanced(), 1);
        assert_eq!(tree.count(), 64);
        assert!(tree.check_bounds());
        let q = Aabb2D::new(20.0, 20.0, 60.0, 60.0);
        let mut got: Vec<u32> = tree.query(q).map(|(i, _)| i).collect();
        got.sort_unstable();
        assert_eq!(got, brute_query(&items, &q));
    }

    #[test]
    fn ties_on_the_split_edge_are_ordered_cyclically() {
        // Same left edge everywhere; the bottom edge decides the side.
        let items: Vec<(u32, Aabb2D<i32>)> =
            (0..9).map(|i| (i as u32, b(5, i, 6, i + 1))).collect();
        let tree = KdTree::build(items.iter().copied()).unwrap();
        for (item, bbox) in &items {
            assert!(tree.is_member(*item, bbox));
        }
        assert!(tree.check_bounds());
    }

    #[test]
    fn identical_boxes_build_and_stay_findable() {
        let items: Vec<(u32, Aabb2D<i32>)> = (0..20).map(|i| (i, b(1, 1, 2, 2))).collect();
        let tree = KdTree::build(items.iter().copied()).unwrap();
        for (item, bbox) in &items {
            assert!(tree.is_member(*item, bbox));
        }
    }

    #[test]
    fn build_from_fn_pulls_until_none() {
        let mut n = 0_u32;
        let tree = KdTree::build_from_fn(KdConfig::default(), || {
            n += 1;
            (n <= 10).then(|| (n, Aabb2D::new(n as f64, 0.0, n as f64 + 0.5, 1.0)))
        })
        .unwrap();
        assert_eq!(tree.count(), 10);
    }

    #[test]
    fn rebuild_drops_tombstones_and_narrows_extent() {
        let mut tree: KdTree<i32, u32> = KdTree::with_config(KdConfig::with_max_build_depth(0));
        for i in 0..32 {
            tree.insert(i as u32, b(i, i, i + 1, i + 1)).unwrap();
        }
        for i in 16..32 {
            tree.delete(i as u32, &b(i, i, i + 1, i + 1)).unwrap();
        }
        // A chain built by sorted inserts collapses only from the bottom.
        assert_eq!(tree.count(), 16);
        let before = tree.health().max_depth;
        tree.set_max_build_depth(100);
        tree.rebuild().unwrap();
        assert_eq!(tree.count(), 16);
        assert_eq!(tree.dead_count(), 0);
        assert_eq!(tree.items_balanced(), 16);
        assert_eq!(tree.extent(), Some(b(0, 0, 16, 16)));
        assert!(tree.health().max_depth < before);
        for i in 0..16 {
            assert!(tree.is_member(i as u32, &b(i, i, i + 1, i + 1)));
        }
    }

    #[test]
    fn failed_rebuild_leaves_tree_untouched() {
        // The builder does not check for repeated items, so a full-depth build
        // keeps them all; a shallow rebuild then meets them during insertion.
        let items: Vec<(u32, Aabb2D<i32>)> =
            (0..8).map(|i| ((i % 4) as u32, b(i, i, i + 1, i + 1))).collect();
        let mut tree = KdTree::build(items.iter().copied()).unwrap();
        assert_eq!(tree.count(), 8);
        tree.set_max_build_depth(1);
        let err = tree.rebuild().unwrap_err();
        assert_eq!(err.fault().unwrap().kind(), FaultKind::Duplicate);
        assert_eq!(tree.count(), 8);
        assert_eq!(tree.items_balanced(), 8);
        assert!(tree.check_bounds());
        for (item, bbox) in &items {
            assert!(tree.is_member(*item, bbox));
        }
    }

    #[test]
    fn rebuild_of_empty_tree_is_a_no_op() {
        let mut tree: KdTree<f64, u32> = KdTree::new();
        tree.rebuild().unwrap();
        assert!(tree.is_empty());
        assert_eq!(tree.extent(), None);
    }
}
