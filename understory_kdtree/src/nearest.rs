// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! k-nearest-neighbour search by edge distance.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;

use crate::node::{HI, LO, NodeIdx, next_disc};
use crate::tree::KdTree;
use crate::types::{Aabb2D, Scalar, axis_gap, sqrt};

/// One result of [`KdTree::nearest`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Neighbor<T, I> {
    /// The stored item.
    pub item: I,
    /// Its box.
    pub bbox: Aabb2D<T>,
    /// Distance from the query point to the nearest edge of `bbox`; zero when
    /// the point is inside.
    pub distance: f64,
}

/// Result of [`KdTree::nearest`].
#[derive(Clone, Debug, PartialEq)]
pub struct Nearest<T, I> {
    /// Up to `m` closest items, nearest first.
    pub neighbors: Vec<Neighbor<T, I>>,
    /// Nodes examined during the search.
    pub visited: usize,
}

/// Squared distance and the entry holding it; `None` while unfilled.
type Slot<T, I> = (f64, Option<(I, Aabb2D<T>)>);

/// Fixed-capacity candidate list ordered by squared distance.
///
/// Unfilled slots hold `+inf`, so the last slot is always the admission bar.
#[derive(Clone, Debug)]
pub(crate) struct PriorityList<T, I> {
    slots: Vec<Slot<T, I>>,
}

impl<T: Copy, I: Copy> PriorityList<T, I> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            slots: vec![(f64::INFINITY, None); capacity],
        }
    }

    /// Squared distance a candidate has to beat.
    pub(crate) fn worst(&self) -> f64 {
        self.slots.last().map_or(f64::NEG_INFINITY, |s| s.0)
    }

    /// Admit a candidate if it beats the worst; returns whether it did.
    pub(crate) fn offer(&mut self, dist_sq: f64, item: I, bbox: Aabb2D<T>) -> bool {
        if dist_sq >= self.worst() {
            return false;
        }
        let mut i = self.slots.len() - 1;
        self.slots[i] = (dist_sq, Some((item, bbox)));
        while i > 0 && self.slots[i - 1].0 > dist_sq {
            self.slots.swap(i - 1, i);
            i -= 1;
        }
        true
    }

    pub(crate) fn into_neighbors(self) -> Vec<Neighbor<T, I>> {
        self.slots
            .into_iter()
            .filter_map(|(d, e)| {
                e.map(|(item, bbox)| Neighbor {
                    item,
                    bbox,
                    distance: sqrt(d),
                })
            })
            .collect()
    }
}

/// A subtree to visit and the region its boxes are known to lie in.
struct Frame {
    idx: NodeIdx,
    disc: usize,
    lo: [f64; 2],
    hi: [f64; 2],
}

impl Frame {
    /// Squared distance from the point to the frame's region, or `None` once
    /// it reaches `limit`.
    fn gap_sq(&self, p: [f64; 2], limit: f64) -> Option<f64> {
        let mut sum = 0.0;
        for (&c, (&lo, &hi)) in p.iter().zip(self.lo.iter().zip(&self.hi)) {
            let g = axis_gap(c, lo, hi);
            sum += g * g;
            if sum >= limit {
                return None;
            }
        }
        Some(sum)
    }
}

impl<T: Scalar, I: Copy + PartialEq + Debug> KdTree<T, I> {
    /// Find the `m` items whose boxes are closest to the point `(x, y)`.
    ///
    /// Returns fewer than `m` when the tree holds fewer live items. Equal
    /// distances are reported in the order they were found.
    pub fn nearest(&self, x: f64, y: f64, m: usize) -> Nearest<T, I> {
        let mut list = PriorityList::new(m);
        let mut visited = 0;
        let p = [x, y];
        let mut stack = match self.root {
            Some(root) if m > 0 => vec![Frame {
                idx: root,
                disc: 0,
                lo: [f64::NEG_INFINITY; 2],
                hi: [f64::INFINITY; 2],
            }],
            _ => Vec::new(),
        };
        while let Some(f) = stack.pop() {
            if f.gap_sq(p, list.worst()).is_none() {
                continue;
            }
            visited += 1;
            let node = &self.nodes[f.idx];
            if let Some(item) = node.item {
                list.offer(node.bbox.distance_sq_to_point(x, y), item, node.bbox);
            }

            let axis = f.disc & 1;
            let near_side = if p[axis] <= node.key(f.disc).to_f64() {
                LO
            } else {
                HI
            };
            // Push the far son first so the near one is searched first.
            for side in [1 - near_side, near_side] {
                let Some(son) = node.sons[side] else {
                    continue;
                };
                let (lo, hi) = if side == LO {
                    node.lo_span(f.disc)
                } else {
                    node.hi_span(f.disc)
                };
                let mut child = Frame {
                    idx: son,
                    disc: next_disc(f.disc),
                    lo: f.lo,
                    hi: f.hi,
                };
                child.lo[axis] = child.lo[axis].max(lo.to_f64());
                child.hi[axis] = child.hi[axis].min(hi.to_f64());
                stack.push(child);
            }
        }
        Nearest {
            neighbors: list.into_neighbors(),
            visited,
        }
    }
}
