// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_kdtree --heading-base-level=0

//! Understory k-d tree: a 2D k-d tree over axis-aligned rectangles.
//!
//! Each entry pairs a caller-supplied item with its bounding box. The tree supports:
//!
//! - Balanced bulk build from an iterator or a pull-based producer, with a depth cap.
//! - Incremental insertion and exact-match lookup.
//! - Lazy deletion (tombstones) and structural deletion that restructures around the gap.
//! - Region queries as a lazy iterator of intersecting items.
//! - k-nearest-neighbour search by distance from a point to box edges.
//! - Rebuild, balance statistics, and a structure dump.
//!
//! # Example
//!
//! ```rust
//! use understory_kdtree::{Aabb2D, KdTree};
//!
//! let mut tree: KdTree<i32, char> = KdTree::new();
//! tree.insert('A', Aabb2D::new(0, 0, 2, 2)).unwrap();
//! tree.insert('B', Aabb2D::new(5, 5, 7, 7)).unwrap();
//! tree.insert('C', Aabb2D::new(1, 1, 3, 3)).unwrap();
//!
//! let mut hits: Vec<char> = tree.query(Aabb2D::new(0, 0, 3, 3)).map(|(c, _)| c).collect();
//! hits.sort();
//! assert_eq!(hits, ['A', 'C']);
//!
//! tree.delete_structural('B', &Aabb2D::new(5, 5, 7, 7)).unwrap();
//! assert_eq!(tree.count(), 2);
//!
//! let near = tree.nearest(10.0, 3.0, 1);
//! assert_eq!(near.neighbors[0].item, 'C');
//! assert_eq!(near.neighbors[0].distance, 7.0);
//! ```
//!
//! Bulk loading is usually faster to query than a tree grown by insertion:
//!
//! ```rust
//! use understory_kdtree::{Aabb2D, KdConfig, KdTree};
//!
//! let cells = (0..100_u32).map(|i| {
//!     let (x, y) = (f64::from(i % 10), f64::from(i / 10));
//!     (i, Aabb2D::new(x, y, x + 0.9, y + 0.9))
//! });
//! let tree = KdTree::build_with(KdConfig::default(), cells).unwrap();
//! assert_eq!(tree.items_balanced(), 100);
//! assert_eq!(tree.query(Aabb2D::new(2.5, 2.5, 3.95, 3.95)).count(), 4);
//! ```
//!
//! ## How it splits
//!
//! The discriminator at depth `d` is the box edge `d % 4`: left, bottom, right, top.
//! Going down, the tree cycles through all four edges, so boxes are ordered by their
//! low and high corners alternately on both axes. Ties are broken by comparing the
//! remaining edges in the same cyclic order; fully identical boxes go to the high side.
//!
//! Every node also keeps three bounds along its split axis describing where its
//! subtrees' boxes can lie, which is what lets region and nearest queries skip
//! whole subtrees. Bounds are widened by inserts and kept by deletes; only
//! [`KdTree::rebuild`] tightens them.
//!
//! ## Deletion
//!
//! [`KdTree::delete`] only marks the node dead; dead nodes with no children are
//! unlinked on the way back up. Heavy lazy deletion leaves tombstones behind, visible
//! in [`KdTree::health`]; [`KdTree::rebuild`] clears them.
//! [`KdTree::delete_structural`] removes the node outright by promoting a replacement
//! from one of its subtrees.
//!
//! ## Errors
//!
//! Operations return [`KdError`]. [`KdError::NotFound`] is an ordinary status;
//! [`KdError::Fault`] reports a broken contract (such as inserting an item twice),
//! carrying a package name, numeric code, and message. Faults are logged through the
//! [`log`] facade at `warn` level; builds log a `debug` summary.
//!
//! ### Float semantics
//!
//! This crate assumes no NaNs for floating-point coordinates.
//!
//! This crate is `no_std` and uses `alloc`. Distances need either the `std` (default)
//! or the `libm` feature.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

#[cfg(not(any(feature = "std", feature = "libm")))]
compile_error!("understory_kdtree requires either the `std` or `libm` feature");

mod build;
pub mod config;
pub mod delete;
pub mod error;
pub mod health;
#[cfg(feature = "kurbo")]
mod kurbo;
pub mod nearest;
mod node;
pub mod query;
pub mod tree;
pub mod types;

#[cfg(test)]
mod testing;

pub use config::KdConfig;
pub use delete::DeleteStats;
pub use error::{Fault, FaultKind, KdError};
pub use health::{Dump, Health};
pub use nearest::{Nearest, Neighbor};
pub use query::RegionQuery;
pub use tree::{KdTree, KdTreeF64, KdTreeI64, SearchPath};
pub use types::{Aabb2D, Scalar};
