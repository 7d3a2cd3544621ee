// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lazy and structural deletion.

use alloc::vec;
use core::cmp::Ordering;
use core::fmt::Debug;

use crate::error::{FaultKind, KdError};
use crate::node::{HI, LO, NodeIdx, is_far, next_disc};
use crate::tree::KdTree;
use crate::types::{Aabb2D, Scalar, cmp_cyclic, min_t};

/// Work done by [`KdTree::delete_structural`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DeleteStats {
    /// Nodes examined while looking for replacements.
    pub tries: usize,
    /// Nodes unlinked from their position: the deleted node plus every
    /// replacement moved up to fill a gap.
    pub relocated: usize,
}

/// A replacement candidate and where it hangs.
#[derive(Copy, Clone)]
struct Candidate {
    idx: NodeIdx,
    parent: NodeIdx,
    side: usize,
    disc: usize,
    /// Levels below the subtree root the search started from.
    depth: usize,
}

#[derive(Copy, Clone)]
enum Extreme {
    Min,
    Max,
}

impl<T: Scalar, I: Copy + PartialEq + Debug> KdTree<T, I> {
    /// Mark `item` deleted without restructuring.
    ///
    /// The node stays as a tombstone until it has no children; childless
    /// tombstones on the path are then unlinked bottom-up. Bound fields and
    /// the extent are left as they are.
    pub fn delete(&mut self, item: I, bbox: &Aabb2D<T>) -> Result<(), KdError> {
        let path = self.search(item, bbox).ok_or(KdError::NotFound)?;
        let (target, _) = path.target();
        self.nodes[target].item = None;
        self.dead_count += 1;

        let mut collapsed = 0;
        for i in (0..path.steps.len()).rev() {
            let (idx, _) = path.steps[i];
            let node = &self.nodes[idx];
            if node.item.is_some() || !node.is_leaf() {
                break;
            }
            match i.checked_sub(1).map(|p| path.steps[p].0) {
                Some(parent) => self.unlink(parent, idx, None)?,
                None => self.root = None,
            }
            self.nodes.free(idx);
            self.dead_count -= 1;
            self.item_count -= 1;
            collapsed += 1;
        }
        log::trace!("kd delete: tombstoned, {collapsed} nodes collapsed");
        Ok(())
    }

    /// Delete `item` and restructure around the gap.
    ///
    /// The node is replaced by the extreme node of one of its subtrees along
    /// its discriminator, which is in turn replaced recursively. The side
    /// alternates between calls when both are present.
    pub fn delete_structural(
        &mut self,
        item: I,
        bbox: &Aabb2D<T>,
    ) -> Result<DeleteStats, KdError> {
        let path = self.search(item, bbox).ok_or(KdError::NotFound)?;
        let (target, disc) = path.target();
        let mut stats = DeleteStats {
            tries: 0,
            relocated: 1,
        };
        let replacement = self.splice_out(target, disc, &mut stats);
        match path.parent() {
            Some(parent) => self.unlink(parent, target, replacement)?,
            None => self.root = replacement,
        }
        self.nodes.free(target);
        self.item_count -= 1;
        log::trace!(
            "kd structural delete: {} tries, {} relocated",
            stats.tries,
            stats.relocated
        );
        Ok(stats)
    }

    /// Point `parent`'s link to `child` at `with` instead.
    fn unlink(
        &mut self,
        parent: NodeIdx,
        child: NodeIdx,
        with: Option<NodeIdx>,
    ) -> Result<(), KdError> {
        let sons = &mut self.nodes[parent].sons;
        let Some(slot) = sons.iter().position(|s| *s == Some(child)) else {
            return Err(KdError::fault_of(FaultKind::BadParent));
        };
        sons[slot] = with;
        Ok(())
    }

    /// Detach `target` from its subtree; returns the node that takes its place.
    ///
    /// `target` keeps its item but loses its sons. The replacement, if any,
    /// inherits the sons and bound fields.
    fn splice_out(
        &mut self,
        target: NodeIdx,
        disc: usize,
        stats: &mut DeleteStats,
    ) -> Option<NodeIdx> {
        let [lo, hi] = self.nodes[target].sons;
        let take_high = match (lo, hi) {
            (None, None) => return None,
            (None, Some(_)) => true,
            (Some(_), None) => false,
            (Some(_), Some(_)) => {
                self.flip = !self.flip;
                self.flip
            }
        };

        // Moving the low minimum to the top turns the low subtree into the
        // high one; only needed when the low maximum has an identical twin and
        // there is no high side to draw from.
        let mut low_becomes_high = false;
        let pick = match (lo, hi) {
            (_, Some(h)) if take_high => {
                self.find_extreme(target, HI, h, disc, Extreme::Min, stats).0
            }
            (Some(l), _) => {
                let (max, ties) = self.find_extreme(target, LO, l, disc, Extreme::Max, stats);
                match hi {
                    _ if ties == 0 => max,
                    Some(h) => self.find_extreme(target, HI, h, disc, Extreme::Min, stats).0,
                    None => {
                        low_becomes_high = true;
                        self.find_extreme(target, LO, l, disc, Extreme::Min, stats).0
                    }
                }
            }
            (None, _) => return None,
        };

        let sub = self.splice_out(pick.idx, pick.disc, stats);
        self.nodes[pick.parent].sons[pick.side] = sub;
        stats.relocated += 1;

        let t = &self.nodes[target];
        let (sons, lo_min, hi_max, other) = (t.sons, t.lo_min, t.hi_max, t.other);
        self.nodes[target].sons = [None, None];
        let r = &mut self.nodes[pick.idx];
        r.lo_min = lo_min;
        r.hi_max = hi_max;
        r.other = other;
        if low_becomes_high {
            r.sons = [None, sons[LO]];
            if is_far(disc) {
                r.other = min_t(other, lo_min);
            }
        } else {
            r.sons = sons;
        }
        Some(pick.idx)
    }

    /// Find the cyclic minimum or maximum along `disc` in the subtree rooted at
    /// `son`, which hangs from `target` on `side`. Also returns how many other
    /// nodes compare equal to it.
    ///
    /// Among equal nodes the deepest wins; at the same depth, the leftmost for
    /// a minimum and the rightmost for a maximum.
    fn find_extreme(
        &self,
        target: NodeIdx,
        side: usize,
        son: NodeIdx,
        disc: usize,
        want: Extreme,
        stats: &mut DeleteStats,
    ) -> (Candidate, usize) {
        let start = Candidate {
            idx: son,
            parent: target,
            side,
            disc: next_disc(disc),
            depth: 0,
        };
        let (better, far_son) = match want {
            Extreme::Min => (Ordering::Less, HI),
            Extreme::Max => (Ordering::Greater, LO),
        };
        // Sons are popped high first, so a later node at the same depth lies
        // further left.
        let prefer_tie = |c: &Candidate, best: &Candidate| match want {
            Extreme::Min => c.depth >= best.depth,
            Extreme::Max => c.depth > best.depth,
        };
        let mut best = start;
        let mut ties = 0;
        let mut stack = vec![start];
        while let Some(c) = stack.pop() {
            stats.tries += 1;
            let node = &self.nodes[c.idx];
            if c.idx != start.idx {
                let ord = cmp_cyclic(&node.bbox, &self.nodes[best.idx].bbox, disc);
                if ord == better {
                    best = c;
                    ties = 0;
                } else if ord == Ordering::Equal {
                    ties += 1;
                    if prefer_tie(&c, &best) {
                        best = c;
                    }
                }
            }
            // At a node splitting on the same edge, one son is entirely on
            // the wrong side of the best so far once the keys differ.
            let best_key = self.nodes[best.idx].key(disc);
            let past_best =
                c.disc == disc && node.key(disc).partial_cmp(&best_key) == Some(better.reverse());
            for s in [LO, HI] {
                if past_best && s == far_son {
                    continue;
                }
                if let Some(son) = node.sons[s] {
                    stack.push(Candidate {
                        idx: son,
                        parent: c.idx,
                        side: s,
                        disc: next_disc(c.disc),
                        depth: c.depth + 1,
                    });
                }
            }
        }
        (best, ties)
    }
}
