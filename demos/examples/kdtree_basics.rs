// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! k-d tree basics.
//!
//! Insert a few boxes, run a region query and a nearest search, delete one
//! box, and print the tree.
//!
//! Run:
//! - `cargo run -p understory_kdtree_demos --example kdtree_basics`

use understory_kdtree::{Aabb2D, KdError, KdTree};

fn main() -> Result<(), KdError> {
    let mut tree: KdTree<i32, char> = KdTree::new();
    tree.insert('A', Aabb2D::new(0, 0, 2, 2))?;
    tree.insert('B', Aabb2D::new(5, 5, 7, 7))?;
    tree.insert('C', Aabb2D::new(1, 1, 3, 3))?;
    tree.insert('D', Aabb2D::new(-4, 6, -1, 9))?;
    print!("{}", tree.dump());

    let q = Aabb2D::new(0, 0, 3, 3);
    let mut hits = tree.query(q);
    for (item, bbox) in hits.by_ref() {
        println!("hit {item} at {bbox:?}");
    }
    println!("tested {} nodes", hits.finish());

    let near = tree.nearest(4.0, 4.0, 2);
    for n in &near.neighbors {
        println!("near {} at distance {:.3}", n.item, n.distance);
    }
    println!("visited {} nodes", near.visited);

    // Inserting the same item again is a fault and leaves the tree unchanged.
    if let Err(e) = tree.insert('A', Aabb2D::new(0, 0, 2, 2)) {
        println!("{e} (fatal: {})", e.is_fatal());
    }

    let stats = tree.delete_structural('B', &Aabb2D::new(5, 5, 7, 7))?;
    println!("deleted B: {stats:?}");
    match tree.delete('B', &Aabb2D::new(5, 5, 7, 7)) {
        Err(e @ KdError::NotFound) => println!("{e}"),
        other => println!("unexpected: {other:?}"),
    }
    print!("{}", tree.dump());
    println!("{}", tree.health());
    Ok(())
}
