// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node storage and per-node bound fields.
//!
//! Every node sits at some depth `d` and splits on the discriminator
//! `d % 4`, which names one edge of its box (see [`Aabb2D::edge`]). The
//! discriminator's axis is `disc & 1`. Each node keeps three bound fields
//! along that axis, covering its descendants:
//!
//! - `lo_min`: minimum near edge over both subtrees.
//! - `hi_max`: maximum far edge over both subtrees.
//! - `other`: for discriminators 0 and 1 (near edges), the maximum far edge
//!   of the low subtree; for 2 and 3 (far edges), the minimum near edge of
//!   the high subtree.
//!
//! The fields may be looser than the true extent of the subtree but never
//! tighter.

use alloc::vec::Vec;
use core::fmt::Debug;
use core::ops::{Index, IndexMut};

use crate::types::{Aabb2D, max_t, min_t};

/// Son slot for items that sort below the node.
pub(crate) const LO: usize = 0;
/// Son slot for items that sort at or above the node.
pub(crate) const HI: usize = 1;

/// Discriminator of the next level down.
#[inline]
pub(crate) const fn next_disc(disc: usize) -> usize {
    (disc + 1) & 3
}

/// Whether the discriminator names a far (right/top) edge.
#[inline]
pub(crate) const fn is_far(disc: usize) -> bool {
    disc & 2 != 0
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct NodeIdx(usize);

impl NodeIdx {
    const fn new(i: usize) -> Self {
        Self(i)
    }

    const fn get(self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Node<T, I> {
    /// `None` marks a tombstone left by a lazy delete.
    pub(crate) item: Option<I>,
    pub(crate) bbox: Aabb2D<T>,
    pub(crate) lo_min: T,
    pub(crate) hi_max: T,
    pub(crate) other: T,
    pub(crate) sons: [Option<NodeIdx>; 2],
}

impl<T: Copy + PartialOrd, I> Node<T, I> {
    /// A childless node whose bound fields cover only its own box.
    pub(crate) fn leaf(item: I, bbox: Aabb2D<T>, disc: usize) -> Self {
        let axis = disc & 1;
        let near = bbox.edge(axis);
        let far = bbox.edge(axis + 2);
        Self {
            item: Some(item),
            bbox,
            lo_min: near,
            hi_max: far,
            other: if is_far(disc) { near } else { far },
            sons: [None, None],
        }
    }

    /// The edge this node splits on.
    #[inline]
    pub(crate) fn key(&self, disc: usize) -> T {
        self.bbox.edge(disc)
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        self.sons[LO].is_none() && self.sons[HI].is_none()
    }

    /// Widen the bound fields for a descendant box on the given side.
    ///
    /// `other` only tracks one side, so callers pass the side the box lives on.
    pub(crate) fn widen(&mut self, disc: usize, side: usize, bbox: &Aabb2D<T>) {
        let axis = disc & 1;
        let near = bbox.edge(axis);
        let far = bbox.edge(axis + 2);
        self.lo_min = min_t(self.lo_min, near);
        self.hi_max = max_t(self.hi_max, far);
        if is_far(disc) {
            if side == HI {
                self.other = min_t(self.other, near);
            }
        } else if side == LO {
            self.other = max_t(self.other, far);
        }
    }

    /// Interval on the split axis that can hold the low subtree.
    #[inline]
    pub(crate) fn lo_span(&self, disc: usize) -> (T, T) {
        if is_far(disc) {
            (self.lo_min, self.key(disc))
        } else {
            (self.lo_min, self.other)
        }
    }

    /// Interval on the split axis that can hold the high subtree.
    #[inline]
    pub(crate) fn hi_span(&self, disc: usize) -> (T, T) {
        if is_far(disc) {
            (self.other, self.hi_max)
        } else {
            (self.key(disc), self.hi_max)
        }
    }
}

/// Arena of nodes with a free list.
///
/// Freed slots are kept as childless tombstones until reused.
pub(crate) struct Arena<T, I> {
    nodes: Vec<Node<T, I>>,
    free: Vec<NodeIdx>,
}

impl<T, I> Default for Arena<T, I> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
        }
    }
}

impl<T, I> Arena<T, I> {
    pub(crate) fn alloc(&mut self, node: Node<T, I>) -> NodeIdx {
        if let Some(idx) = self.free.pop() {
            self.nodes[idx.get()] = node;
            idx
        } else {
            self.nodes.push(node);
            NodeIdx::new(self.nodes.len() - 1)
        }
    }

    /// Release a slot; returns the item it held, if any.
    pub(crate) fn free(&mut self, idx: NodeIdx) -> Option<I> {
        let node = &mut self.nodes[idx.get()];
        node.sons = [None, None];
        self.free.push(idx);
        node.item.take()
    }

    /// Slots in use.
    pub(crate) fn live(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
    }
}

impl<T, I> Index<NodeIdx> for Arena<T, I> {
    type Output = Node<T, I>;

    #[inline]
    fn index(&self, idx: NodeIdx) -> &Node<T, I> {
        &self.nodes[idx.get()]
    }
}

impl<T, I> IndexMut<NodeIdx> for Arena<T, I> {
    #[inline]
    fn index_mut(&mut self, idx: NodeIdx) -> &mut Node<T, I> {
        &mut self.nodes[idx.get()]
    }
}

impl<T, I> Debug for Arena<T, I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Arena")
            .field("slots", &self.nodes.len())
            .field("free", &self.free.len())
            .finish_non_exhaustive()
    }
}
