// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive geometry types and helpers.

use core::cmp::Ordering;
use core::fmt::Debug;

/// Axis-aligned bounding box in 2D.
///
/// The four edges are also addressable by index through [`Aabb2D::edge`], in the
/// order `[left, bottom, right, top]`. The tree's discriminator cycles through
/// those indices, so depth `d` splits on `edge(d % 4)`.
///
/// `min_x <= max_x` and `min_y <= max_y` are assumed, not enforced.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Aabb2D<T> {
    /// Minimum x (left)
    pub min_x: T,
    /// Minimum y (bottom)
    pub min_y: T,
    /// Maximum x (right)
    pub max_x: T,
    /// Maximum y (top)
    pub max_y: T,
}

impl<T> Aabb2D<T> {
    /// Create a new AABB from min/max corners.
    pub const fn new(min_x: T, min_y: T, max_x: T, max_y: T) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }
}

impl Aabb2D<f64> {
    /// Create an AABB from origin and size in f64.
    pub const fn from_xywh(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x + w,
            max_y: y + h,
        }
    }
}

impl Aabb2D<i64> {
    /// Create an AABB from origin and size in i64.
    pub const fn from_xywh(x: i64, y: i64, w: i64, h: i64) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x + w,
            max_y: y + h,
        }
    }
}

impl<T: Copy> Aabb2D<T> {
    /// Edge by discriminator index: 0 left, 1 bottom, 2 right, 3 top.
    ///
    /// Indices are taken modulo 4.
    #[inline]
    pub fn edge(&self, i: usize) -> T {
        match i & 3 {
            0 => self.min_x,
            1 => self.min_y,
            2 => self.max_x,
            _ => self.max_y,
        }
    }

    /// A degenerate box covering a single point.
    pub const fn from_point(x: T, y: T) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }
}

impl<T: Copy + PartialOrd> Aabb2D<T> {
    /// Whether this AABB contains the point. Edges are inclusive.
    pub fn contains_point(&self, x: T, y: T) -> bool {
        le(self.min_x, x) && le(self.min_y, y) && le(x, self.max_x) && le(y, self.max_y)
    }

    /// Whether two AABBs overlap. Boxes that only touch along an edge or a
    /// corner count as intersecting.
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        le(other.min_x, self.max_x)
            && le(self.min_x, other.max_x)
            && le(other.min_y, self.max_y)
            && le(self.min_y, other.max_y)
    }

    /// The smallest AABB covering both.
    pub fn union(&self, other: &Self) -> Self {
        union_aabb(*self, *other)
    }
}

impl<T: Scalar> Aabb2D<T> {
    /// Edge-to-edge distance from a point to this box.
    ///
    /// Zero when the point lies inside (or on the boundary); otherwise the
    /// Euclidean distance to the nearest edge or corner.
    pub fn distance_to_point(&self, x: f64, y: f64) -> f64 {
        sqrt(self.distance_sq_to_point(x, y))
    }

    pub(crate) fn distance_sq_to_point(&self, x: f64, y: f64) -> f64 {
        let dx = axis_gap(x, self.min_x.to_f64(), self.max_x.to_f64());
        let dy = axis_gap(y, self.min_y.to_f64(), self.max_y.to_f64());
        dx * dx + dy * dy
    }
}

#[cfg(feature = "std")]
#[inline]
pub(crate) fn sqrt(v: f64) -> f64 {
    v.sqrt()
}

#[cfg(all(not(feature = "std"), feature = "libm"))]
#[inline]
pub(crate) fn sqrt(v: f64) -> f64 {
    libm::sqrt(v)
}

/// Distance from `v` to the closed interval `[lo, hi]`.
#[inline]
pub(crate) fn axis_gap(v: f64, lo: f64, hi: f64) -> f64 {
    if v < lo {
        lo - v
    } else if v > hi {
        v - hi
    } else {
        0.0
    }
}

/// Numeric scalar abstraction for box coordinates.
///
/// The tree itself only needs ordering; the `f64` projection is used for the
/// builder's running means and for nearest-neighbour distances.
pub trait Scalar: Copy + PartialOrd + Debug {
    /// Project the coordinate onto `f64`.
    fn to_f64(self) -> f64;
}

impl Scalar for i32 {
    #[inline]
    fn to_f64(self) -> f64 {
        f64::from(self)
    }
}

impl Scalar for i64 {
    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Scalar for f32 {
    #[inline]
    fn to_f64(self) -> f64 {
        f64::from(self)
    }
}

impl Scalar for f64 {
    #[inline]
    fn to_f64(self) -> f64 {
        self
    }
}

/// Total comparison for coordinates; incomparable values (NaN) compare equal.
#[inline]
pub(crate) fn cmp_t<T: PartialOrd>(a: T, b: T) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Compare two boxes edge by edge, starting at discriminator `disc` and
/// cycling through all four edges.
pub(crate) fn cmp_cyclic<T: PartialOrd + Copy>(
    a: &Aabb2D<T>,
    b: &Aabb2D<T>,
    disc: usize,
) -> Ordering {
    for k in 0..4 {
        match cmp_t(a.edge(disc + k), b.edge(disc + k)) {
            Ordering::Equal => continue,
            o => return o,
        }
    }
    Ordering::Equal
}

pub(crate) fn min_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Greater) => b,
        _ => a,
    }
}

pub(crate) fn max_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Less) => b,
        _ => a,
    }
}

pub(crate) fn le<T: PartialOrd>(a: T, b: T) -> bool {
    a.partial_cmp(&b)
        .map(|o| o != Ordering::Greater)
        .unwrap_or(false)
}

pub(crate) fn union_aabb<T: PartialOrd + Copy>(a: Aabb2D<T>, b: Aabb2D<T>) -> Aabb2D<T> {
    Aabb2D {
        min_x: min_t(a.min_x, b.min_x),
        min_y: min_t(a.min_y, b.min_y),
        max_x: max_t(a.max_x, b.max_x),
        max_y: max_t(a.max_y, b.max_y),
    }
}
