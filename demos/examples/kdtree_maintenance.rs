// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree health under churn.
//!
//! Bulk-build a grid of cells, lazily delete most of them, and compare the
//! health summary before and after a rebuild. Structural deletes are shown
//! with their work counters.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p understory_kdtree_demos --example kdtree_maintenance`

use understory_kdtree::{Aabb2D, KdConfig, KdError, KdTreeF64};

fn cell(i: u32) -> Aabb2D<f64> {
    let (x, y) = (f64::from(i % 64), f64::from(i / 64));
    Aabb2D::<f64>::from_xywh(x * 10.0, y * 10.0, 9.0, 9.0)
}

fn main() -> Result<(), KdError> {
    env_logger::init();

    let cells = (0..4096).map(|i| (i, cell(i)));
    let mut tree: KdTreeF64<u32> =
        KdTreeF64::build_with(KdConfig::with_max_build_depth(10), cells)?;
    println!("built:   {}", tree.health());
    println!("balanced {} of {}", tree.items_balanced(), tree.count());

    for i in (0..4096).filter(|i| i % 4 != 0) {
        tree.delete(i, &cell(i))?;
    }
    println!("deleted: {}", tree.health());

    let previous = tree.set_max_build_depth(100);
    log::info!("rebuild depth cap {previous} -> 100");
    tree.rebuild()?;
    println!("rebuilt: {}", tree.health());

    let mut tries = 0;
    let mut relocated = 0;
    for i in (0..4096).step_by(8) {
        let stats = tree.delete_structural(i, &cell(i))?;
        tries += stats.tries;
        relocated += stats.relocated;
    }
    println!("structural deletes: {tries} nodes examined, {relocated} relocated");
    println!("final:   {}", tree.health());
    println!("bounds ok: {}", tree.check_bounds());
    Ok(())
}
