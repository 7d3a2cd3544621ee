// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![cfg(feature = "compare_rstar")]

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_kdtree::{Aabb2D, KdTree};

use rstar::primitives::Rectangle;
use rstar::{AABB, RTree};

fn gen_grid_rects(n: usize, cell: f64) -> Vec<Aabb2D<f64>> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            let x0 = x as f64 * cell;
            let y0 = y as f64 * cell;
            out.push(Aabb2D::<f64>::from_xywh(x0, y0, cell, cell));
        }
    }
    out
}

fn to_rstar_rects(v: &[Aabb2D<f64>]) -> Vec<Rectangle<[f64; 2]>> {
    v.iter()
        .map(|r| Rectangle::from_corners([r.min_x, r.min_y], [r.max_x, r.max_y]))
        .collect()
}

fn bench_kdtree_external_compare_f64(c: &mut Criterion) {
    let mut group = c.benchmark_group("kdtree_external_compare_f64");
    for &n in &[64usize, 128] {
        let rects = gen_grid_rects(n, 10.0);
        let aabb_query = Aabb2D::<f64>::from_xywh(100.0, 100.0, 400.0, 400.0);
        group.throughput(Throughput::Elements((n * n) as u64));

        group.bench_function(format!("kdtree_build_query_insert_n{}", n), |b| {
            b.iter_batched(
                KdTree::<f64, u32>::new,
                |mut tree| {
                    for (i, r) in rects.iter().copied().enumerate() {
                        tree.insert(i as u32, r).unwrap();
                    }
                    let hits: usize = tree.query(aabb_query).count();
                    black_box(hits);
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("kdtree_build_query_bulk_n{}", n), |b| {
            b.iter_batched(
                || {
                    let entries: Vec<_> = rects
                        .iter()
                        .copied()
                        .enumerate()
                        .map(|(i, r)| (i as u32, r))
                        .collect();
                    entries
                },
                |entries| {
                    let tree = KdTree::build(entries).unwrap();
                    let hits: usize = tree.query(aabb_query).count();
                    black_box(hits);
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("rstar_build_query_bulk_n{}", n), |b| {
            b.iter_batched(
                || to_rstar_rects(&rects),
                |rectangles| {
                    let tree = RTree::bulk_load(rectangles);
                    let aabb = AABB::from_corners(
                        [aabb_query.min_x, aabb_query.min_y],
                        [aabb_query.max_x, aabb_query.max_y],
                    );
                    let hits: usize = tree.locate_in_envelope_intersecting(&aabb).count();
                    black_box(hits);
                },
                BatchSize::SmallInput,
            )
        });

        let tree = KdTree::build(rects.iter().copied().enumerate().map(|(i, r)| (i as u32, r)))
            .unwrap();
        let rtree = RTree::bulk_load(to_rstar_rects(&rects));
        group.bench_function(format!("kdtree_nearest_4_n{}", n), |b| {
            b.iter(|| {
                let near = tree.nearest(333.0, 444.0, 4);
                black_box(near.neighbors.len());
            })
        });
        group.bench_function(format!("rstar_nearest_4_n{}", n), |b| {
            b.iter(|| {
                let near: usize = rtree.nearest_neighbor_iter(&[333.0, 444.0]).take(4).count();
                black_box(near);
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_kdtree_external_compare_f64);
criterion_main!(benches);
