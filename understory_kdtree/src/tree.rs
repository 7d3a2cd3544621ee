// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The tree handle, insertion, and exact-match search.

use alloc::vec;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt::Debug;

use crate::config::KdConfig;
use crate::error::{FaultKind, KdError};
use crate::node::{Arena, HI, LO, Node, NodeIdx, next_disc};
use crate::types::{Aabb2D, Scalar, cmp_cyclic, union_aabb};

/// A 2D k-d tree of axis-aligned boxes.
///
/// Each entry pairs a caller-supplied item `I` with its box. Items are
/// compared by value to find entries again, so they should be unique handles
/// (ids, indices, keys). The box an item was inserted with is needed to find
/// it again for deletion.
///
/// Depth `d` splits on the box edge `d % 4` (left, bottom, right, top); see
/// [`Aabb2D::edge`].
pub struct KdTree<T: Scalar, I: Copy + PartialEq + Debug> {
    pub(crate) nodes: Arena<T, I>,
    pub(crate) root: Option<NodeIdx>,
    /// Live items plus tombstones.
    pub(crate) item_count: usize,
    pub(crate) dead_count: usize,
    pub(crate) extent: Option<Aabb2D<T>>,
    pub(crate) items_balanced: usize,
    pub(crate) config: KdConfig,
    /// Preferred side for the next structural delete.
    pub(crate) flip: bool,
}

/// Root-to-node path found by [`KdTree::search`].
///
/// The last step is the matching node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchPath {
    pub(crate) steps: Vec<(NodeIdx, usize)>,
}

impl SearchPath {
    /// Number of nodes on the path, including the match.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always false; a path holds at least the match.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Depth of the match; the root is depth 0.
    pub fn depth(&self) -> usize {
        self.steps.len() - 1
    }

    pub(crate) fn target(&self) -> (NodeIdx, usize) {
        self.steps[self.steps.len() - 1]
    }

    pub(crate) fn parent(&self) -> Option<NodeIdx> {
        let n = self.steps.len();
        (n >= 2).then(|| self.steps[n - 2].0)
    }
}

/// Side an incoming box descends to: low only when it sorts strictly below.
#[inline]
pub(crate) fn side_of<T: Copy + PartialOrd>(
    bbox: &Aabb2D<T>,
    node: &Aabb2D<T>,
    disc: usize,
) -> usize {
    if cmp_cyclic(bbox, node, disc) == Ordering::Less {
        LO
    } else {
        HI
    }
}

impl<T: Scalar, I: Copy + PartialEq + Debug> Default for KdTree<T, I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar, I: Copy + PartialEq + Debug> KdTree<T, I> {
    /// Create an empty tree with the default config.
    pub fn new() -> Self {
        Self::with_config(KdConfig::default())
    }

    /// Create an empty tree with the given config.
    pub fn with_config(config: KdConfig) -> Self {
        Self {
            nodes: Arena::default(),
            root: None,
            item_count: 0,
            dead_count: 0,
            extent: None,
            items_balanced: 0,
            config,
            flip: false,
        }
    }

    /// The tree's config.
    pub fn config(&self) -> KdConfig {
        self.config
    }

    /// Set the builder depth cap used by later rebuilds; returns the old cap.
    pub fn set_max_build_depth(&mut self, depth: usize) -> usize {
        core::mem::replace(&mut self.config.max_build_depth, depth)
    }

    /// Insert an item with its box.
    ///
    /// Fails with a [`FaultKind::Duplicate`] fault, leaving the tree untouched,
    /// if the same item is met on the way down.
    pub fn insert(&mut self, item: I, bbox: Aabb2D<T>) -> Result<(), KdError> {
        let Some(root) = self.root else {
            self.root = Some(self.nodes.alloc(Node::leaf(item, bbox, 0)));
            self.note_added(&bbox);
            return Ok(());
        };
        let mut path: Vec<(NodeIdx, usize, usize)> = Vec::new();
        let mut cur = root;
        let mut disc = 0;
        loop {
            let node = &self.nodes[cur];
            if node.item == Some(item) {
                return Err(KdError::fault_of(FaultKind::Duplicate));
            }
            let side = side_of(&bbox, &node.bbox, disc);
            path.push((cur, disc, side));
            match node.sons[side] {
                Some(next) => {
                    cur = next;
                    disc = next_disc(disc);
                }
                None => break,
            }
        }
        for &(idx, d, side) in &path {
            self.nodes[idx].widen(d, side, &bbox);
        }
        let leaf = self.nodes.alloc(Node::leaf(item, bbox, next_disc(disc)));
        let (parent, _, side) = path[path.len() - 1];
        self.nodes[parent].sons[side] = Some(leaf);
        self.note_added(&bbox);
        Ok(())
    }

    fn note_added(&mut self, bbox: &Aabb2D<T>) {
        self.item_count += 1;
        self.extent = Some(match self.extent {
            Some(e) => union_aabb(e, *bbox),
            None => *bbox,
        });
    }

    /// Find the node holding `item`, descending by `bbox`.
    ///
    /// Tombstones never match.
    pub fn search(&self, item: I, bbox: &Aabb2D<T>) -> Option<SearchPath> {
        let mut steps = Vec::new();
        let mut cur = self.root;
        let mut disc = 0;
        while let Some(idx) = cur {
            let node = &self.nodes[idx];
            steps.push((idx, disc));
            if node.item == Some(item) {
                return Some(SearchPath { steps });
            }
            cur = node.sons[side_of(bbox, &node.bbox, disc)];
            disc = next_disc(disc);
        }
        None
    }

    /// Whether `item` is stored under `bbox`.
    pub fn is_member(&self, item: I, bbox: &Aabb2D<T>) -> bool {
        self.search(item, bbox).is_some()
    }

    /// Number of live items.
    pub fn count(&self) -> usize {
        self.item_count - self.dead_count
    }

    /// Number of nodes, counting tombstones left by lazy deletes.
    pub fn len_with_tombstones(&self) -> usize {
        self.item_count
    }

    /// Number of tombstones.
    pub fn dead_count(&self) -> usize {
        self.dead_count
    }

    /// Whether the tree holds no live items.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Box covering everything ever inserted since the last build or rebuild.
    ///
    /// Deletes do not shrink it.
    pub fn extent(&self) -> Option<Aabb2D<T>> {
        self.extent
    }

    /// Number of items placed by the balanced builder at the last build or
    /// rebuild.
    pub fn items_balanced(&self) -> usize {
        self.items_balanced
    }

    /// Remove everything. The config is kept.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.item_count = 0;
        self.dead_count = 0;
        self.extent = None;
        self.items_balanced = 0;
    }

    /// Remove everything, handing each live item to `f` on the way out.
    pub fn destroy_with(&mut self, mut f: impl FnMut(I, Aabb2D<T>)) {
        for (item, bbox) in self.items() {
            f(item, bbox);
        }
        self.clear();
    }

    /// Live items and their boxes, in depth-first order.
    pub fn items(&self) -> Vec<(I, Aabb2D<T>)> {
        let mut out = Vec::with_capacity(self.count());
        let Some(root) = self.root else {
            return out;
        };
        let mut stack = vec![root];
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            if let Some(item) = node.item {
                out.push((item, node.bbox));
            }
            if let Some(hi) = node.sons[HI] {
                stack.push(hi);
            }
            if let Some(lo) = node.sons[LO] {
                stack.push(lo);
            }
        }
        out
    }
}

impl<T: Scalar, I: Copy + PartialEq + Debug> Debug for KdTree<T, I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("KdTree")
            .field("count", &self.count())
            .field("dead", &self.dead_count)
            .field("extent", &self.extent)
            .field("items_balanced", &self.items_balanced)
            .field("config", &self.config)
            .field("nodes", &self.nodes)
            .finish_non_exhaustive()
    }
}

/// k-d tree with `f64` coordinates.
pub type KdTreeF64<I> = KdTree<f64, I>;

/// k-d tree with `i64` coordinates.
pub type KdTreeI64<I> = KdTree<i64, I>;
