// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Using the k-d tree with Kurbo geometry.
//!
//! Index a row of widgets by their `Rect`s and find what lies under and
//! around a pointer.
//!
//! Run:
//! - `cargo run -p understory_kdtree_demos --example kdtree_kurbo`

use kurbo::{Point, Rect};
use understory_kdtree::{Aabb2D, KdError, KdTreeF64};

fn main() -> Result<(), KdError> {
    let widgets = (0..12_u32).map(|i| {
        let x = f64::from(i) * 50.0;
        let bbox: Aabb2D<f64> = Rect::new(x, 0.0, x + 40.0, 30.0).into();
        (i, bbox)
    });
    let tree: KdTreeF64<u32> = KdTreeF64::build(widgets)?;

    let pointer = Point::new(142.0, 12.0);
    let probe = Rect::from_center_size(pointer, (1.0, 1.0));
    for (id, bbox) in tree.query(probe.into()) {
        println!("under pointer: widget {id} at {:?}", Rect::from(bbox));
    }
    for n in tree.nearest_point(pointer, 3).neighbors {
        println!("near pointer: widget {} ({:.1} away)", n.item, n.distance);
    }
    Ok(())
}
