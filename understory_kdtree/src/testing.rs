// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared fixtures and brute-force oracles for unit tests.

use alloc::vec;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt::Debug;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::node::{HI, LO, NodeIdx, next_disc};
use crate::tree::KdTree;
use crate::types::{Aabb2D, Scalar, cmp_cyclic};

/// `n` boxes with corners in `[0, 100)` and sides up to 10, ids `0..n`.
pub(crate) fn random_boxes(seed: u64, n: u32) -> Vec<(u32, Aabb2D<f64>)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let x = rng.random_range(0.0..100.0);
            let y = rng.random_range(0.0..100.0);
            let w = rng.random_range(0.0..10.0);
            let h = rng.random_range(0.0..10.0);
            (i, Aabb2D::new(x, y, x + w, y + h))
        })
        .collect()
}

/// Sorted ids of the boxes intersecting `q`.
pub(crate) fn brute_query(items: &[(u32, Aabb2D<f64>)], q: &Aabb2D<f64>) -> Vec<u32> {
    let mut out: Vec<u32> = items
        .iter()
        .filter(|(_, b)| b.intersects(q))
        .map(|(i, _)| *i)
        .collect();
    out.sort_unstable();
    out
}

/// All distances from `(x, y)` to the boxes, ascending.
pub(crate) fn brute_distances(items: &[(u32, Aabb2D<f64>)], x: f64, y: f64) -> Vec<f64> {
    let mut d: Vec<f64> = items
        .iter()
        .map(|(_, b)| b.distance_to_point(x, y))
        .collect();
    d.sort_unstable_by(f64::total_cmp);
    d
}

/// Panic unless every node sorts above its low subtree and at or below its
/// high subtree.
pub(crate) fn assert_ordered<T: Scalar, I: Copy + PartialEq + Debug>(tree: &KdTree<T, I>) {
    let Some(root) = tree.root else {
        return;
    };
    let mut stack = vec![(root, 0)];
    while let Some((idx, disc)) = stack.pop() {
        let node = &tree.nodes[idx];
        for (side, want_less) in [(LO, true), (HI, false)] {
            let Some(son) = node.sons[side] else {
                continue;
            };
            stack.push((son, next_disc(disc)));
            for below in subtree(tree, son) {
                let ord = cmp_cyclic(&tree.nodes[below].bbox, &node.bbox, disc);
                assert_eq!(
                    ord == Ordering::Less,
                    want_less,
                    "{:?} misplaced under {:?}",
                    tree.nodes[below].bbox,
                    node.bbox
                );
            }
        }
    }
}

fn subtree<T: Scalar, I: Copy + PartialEq + Debug>(
    tree: &KdTree<T, I>,
    root: NodeIdx,
) -> Vec<NodeIdx> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(idx) = stack.pop() {
        out.push(idx);
        stack.extend(tree.nodes[idx].sons.iter().flatten());
    }
    out
}
