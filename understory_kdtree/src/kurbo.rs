// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interop with Kurbo geometry.

use core::fmt::Debug;

use kurbo::{Point, Rect};

use crate::nearest::Nearest;
use crate::tree::KdTree;
use crate::types::Aabb2D;

impl From<Rect> for Aabb2D<f64> {
    /// Takes the rectangle's corners as given; call [`Rect::abs`] first if
    /// it may have negative width or height.
    fn from(r: Rect) -> Self {
        Self::new(r.x0, r.y0, r.x1, r.y1)
    }
}

impl From<Aabb2D<f64>> for Rect {
    fn from(b: Aabb2D<f64>) -> Self {
        Self::new(b.min_x, b.min_y, b.max_x, b.max_y)
    }
}

impl<I: Copy + PartialEq + Debug> KdTree<f64, I> {
    /// [`KdTree::nearest`] taking a Kurbo point.
    pub fn nearest_point(&self, pt: Point, m: usize) -> Nearest<f64, I> {
        self.nearest(pt.x, pt.y, m)
    }
}
