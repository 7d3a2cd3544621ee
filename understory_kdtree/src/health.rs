// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree diagnostics: balance summary, structure dump, and bounds checking.

use alloc::vec;
use core::fmt;
use core::fmt::Debug;

use crate::node::{HI, LO, NodeIdx, next_disc};
use crate::tree::KdTree;
use crate::types::{Aabb2D, Scalar, le, union_aabb};

/// Shape statistics for a tree. See [`KdTree::health`].
///
/// Node counts include tombstones.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Health {
    /// Nodes in the tree, tombstones included.
    pub nodes: usize,
    /// Deepest level; the root is level 1.
    pub max_depth: usize,
    /// Depth of a perfectly balanced tree with as many nodes.
    pub min_depth: usize,
    /// `max_depth / min_depth`; 1.0 is perfectly balanced.
    pub balance_ratio: f64,
    /// Nodes with exactly one son.
    pub single_child_nodes: usize,
    /// `single_child_nodes / nodes`.
    pub single_child_ratio: f64,
    /// Tombstones.
    pub dead: usize,
    /// `dead / nodes`.
    pub dead_ratio: f64,
}

impl fmt::Display for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "balance ratio={} (the closer to 1.0, the better), \
             #of nodes with only one branch={} ({}%), max depth={}, dead={} ({}%)",
            self.balance_ratio,
            self.single_child_nodes,
            self.single_child_ratio * 100.0,
            self.max_depth,
            self.dead,
            self.dead_ratio * 100.0
        )
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

impl<T: Scalar, I: Copy + PartialEq + Debug> KdTree<T, I> {
    /// Measure the tree's shape.
    pub fn health(&self) -> Health {
        let nodes = self.nodes.live();
        let mut max_depth = 0;
        let mut single_child_nodes = 0;
        if let Some(root) = self.root {
            let mut stack = vec![(root, 1)];
            while let Some((idx, depth)) = stack.pop() {
                max_depth = max_depth.max(depth);
                let sons = self.nodes[idx].sons;
                if sons[LO].is_some() != sons[HI].is_some() {
                    single_child_nodes += 1;
                }
                stack.extend(sons.iter().flatten().map(|&s| (s, depth + 1)));
            }
        }
        // floor(log2(nodes)) + 1
        let mut min_depth = 0;
        let mut n = nodes;
        while n > 0 {
            min_depth += 1;
            n >>= 1;
        }
        Health {
            nodes,
            max_depth,
            min_depth,
            balance_ratio: ratio(max_depth, min_depth),
            single_child_nodes,
            single_child_ratio: ratio(single_child_nodes, nodes),
            dead: self.dead_count,
            dead_ratio: ratio(self.dead_count, nodes),
        }
    }

    /// Indented printout of every node, low son before high son.
    ///
    /// Each line shows the item (or `<dead>`), the bound fields, and the box
    /// with the discriminating edge starred.
    pub fn dump(&self) -> Dump<'_, T, I> {
        Dump { tree: self }
    }

    /// Whether every node's bound fields cover its subtrees.
    ///
    /// Region and nearest queries rely on this to prune; it holds after any
    /// sequence of public operations.
    pub fn check_bounds(&self) -> bool {
        self.root
            .is_none_or(|root| self.checked_extent(root, 0).is_some())
    }

    /// Union of the subtree's boxes, or `None` if some bound field misses a
    /// descendant.
    fn checked_extent(&self, idx: NodeIdx, disc: usize) -> Option<Aabb2D<T>> {
        let node = &self.nodes[idx];
        let axis = disc & 1;
        let mut ext = node.bbox;
        for side in [LO, HI] {
            let Some(son) = node.sons[side] else {
                continue;
            };
            let below = self.checked_extent(son, next_disc(disc))?;
            let (lo, hi) = if side == LO {
                node.lo_span(disc)
            } else {
                node.hi_span(disc)
            };
            if !(le(lo, below.edge(axis)) && le(below.edge(axis + 2), hi)) {
                log::warn!(
                    "kd bounds: {:?} side {side} of node {:?} spans {:?} outside {:?}",
                    node.item,
                    node.bbox,
                    below,
                    (lo, hi)
                );
                return None;
            }
            ext = union_aabb(ext, below);
        }
        Some(ext)
    }
}

/// Display adapter returned by [`KdTree::dump`].
pub struct Dump<'a, T: Scalar, I: Copy + PartialEq + Debug> {
    tree: &'a KdTree<T, I>,
}

impl<T: Scalar, I: Copy + PartialEq + Debug> fmt::Display for Dump<'_, T, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tree = self.tree;
        let Some(root) = tree.root else {
            return f.write_str("<empty>\n");
        };
        let mut stack = vec![(root, 0_usize, "root")];
        while let Some((idx, depth, label)) = stack.pop() {
            let node = &tree.nodes[idx];
            let disc = depth & 3;
            write!(f, "{:indent$}{label} ", "", indent = depth * 2)?;
            match node.item {
                Some(item) => write!(f, "{item:?}")?,
                None => f.write_str("<dead>")?,
            }
            write!(
                f,
                " lo={:?} hi={:?} other={:?} [",
                node.lo_min, node.hi_max, node.other
            )?;
            for e in 0..4 {
                let sep = if e == 0 { "" } else { ", " };
                let star = if e == disc { "*" } else { "" };
                write!(f, "{sep}{:?}{star}", node.bbox.edge(e))?;
            }
            f.write_str("]\n")?;
            if let Some(hi) = node.sons[HI] {
                stack.push((hi, depth + 1, "hi"));
            }
            if let Some(lo) = node.sons[LO] {
                stack.push((lo, depth + 1, "lo"));
            }
        }
        Ok(())
    }
}

impl<T: Scalar, I: Copy + PartialEq + Debug> Debug for Dump<'_, T, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dump").finish_non_exhaustive()
    }
}
