// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Region queries.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::iter::FusedIterator;

use crate::node::{HI, LO, Node, NodeIdx, next_disc};
use crate::tree::KdTree;
use crate::types::{Aabb2D, Scalar, le};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Step {
    TestSelf,
    LowSon,
    HighSon,
}

#[derive(Copy, Clone, Debug)]
struct Frame {
    idx: NodeIdx,
    disc: usize,
    step: Step,
}

/// Lazy iterator over the items whose boxes intersect a query rectangle.
///
/// Created by [`KdTree::query`]. Boxes that only touch the rectangle count as
/// intersecting. Each live item is yielded at most once, in no particular
/// order. Once exhausted it keeps returning `None`.
pub struct RegionQuery<'a, T: Scalar, I: Copy + PartialEq + Debug> {
    tree: &'a KdTree<T, I>,
    rect: Aabb2D<T>,
    stack: Vec<Frame>,
    tested: usize,
}

impl<T: Scalar, I: Copy + PartialEq + Debug> KdTree<T, I> {
    /// Iterate the items whose boxes intersect `rect`.
    pub fn query(&self, rect: Aabb2D<T>) -> RegionQuery<'_, T, I> {
        let stack = match self.root {
            Some(root) => vec![Frame {
                idx: root,
                disc: 0,
                step: Step::TestSelf,
            }],
            None => Vec::new(),
        };
        RegionQuery {
            tree: self,
            rect,
            stack,
            tested: 0,
        }
    }
}

impl<T: Scalar, I: Copy + PartialEq + Debug> RegionQuery<'_, T, I> {
    /// Stop early and return the number of nodes tested so far.
    pub fn finish(self) -> usize {
        self.tested
    }

    /// Nodes tested so far.
    pub fn tested(&self) -> usize {
        self.tested
    }

    fn may_hold(&self, span: (T, T), axis: usize) -> bool {
        let (lo, hi) = span;
        le(self.rect.edge(axis), hi) && le(lo, self.rect.edge(axis + 2))
    }

    fn son_if_reachable(&self, node: &Node<T, I>, disc: usize, side: usize) -> Option<NodeIdx> {
        let son = node.sons[side]?;
        let span = if side == LO {
            node.lo_span(disc)
        } else {
            node.hi_span(disc)
        };
        self.may_hold(span, disc & 1).then_some(son)
    }
}

impl<T: Scalar, I: Copy + PartialEq + Debug> Iterator for RegionQuery<'_, T, I> {
    type Item = (I, Aabb2D<T>);

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        while let Some(top) = self.stack.last_mut() {
            let Frame { idx, disc, step } = *top;
            let node = &tree.nodes[idx];
            match step {
                Step::TestSelf => {
                    top.step = Step::LowSon;
                    self.tested += 1;
                    if let Some(item) = node.item
                        && node.bbox.intersects(&self.rect)
                    {
                        return Some((item, node.bbox));
                    }
                }
                Step::LowSon => {
                    top.step = Step::HighSon;
                    if let Some(son) = self.son_if_reachable(node, disc, LO) {
                        self.stack.push(Frame {
                            idx: son,
                            disc: next_disc(disc),
                            step: Step::TestSelf,
                        });
                    }
                }
                Step::HighSon => {
                    self.stack.pop();
                    if let Some(son) = self.son_if_reachable(node, disc, HI) {
                        self.stack.push(Frame {
                            idx: son,
                            disc: next_disc(disc),
                            step: Step::TestSelf,
                        });
                    }
                }
            }
        }
        None
    }
}

impl<T: Scalar, I: Copy + PartialEq + Debug> FusedIterator for RegionQuery<'_, T, I> {}

impl<T: Scalar, I: Copy + PartialEq + Debug> Debug for RegionQuery<'_, T, I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RegionQuery")
            .field("rect", &self.rect)
            .field("pending", &self.stack.len())
            .field("tested", &self.tested)
            .finish_non_exhaustive()
    }
}
