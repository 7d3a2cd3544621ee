// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_kdtree::{Aabb2D, KdConfig, KdTree};

fn gen_grid_rects(n: usize, cell: f64) -> Vec<(u32, Aabb2D<f64>)> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            let x0 = x as f64 * cell;
            let y0 = y as f64 * cell;
            out.push(((y * n + x) as u32, Aabb2D::from_xywh(x0, y0, cell, cell)));
        }
    }
    out
}

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

fn gen_random_rects(count: usize, extent: f64, max_side: f64) -> Vec<(u32, Aabb2D<f64>)> {
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    (0..count)
        .map(|i| {
            let x0 = rng.next_f64() * extent;
            let y0 = rng.next_f64() * extent;
            let w = rng.next_f64() * max_side;
            let h = rng.next_f64() * max_side;
            (i as u32, Aabb2D::from_xywh(x0, y0, w, h))
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("kdtree_build");
    for &n in &[64usize, 128] {
        let rects = gen_grid_rects(n, 10.0);
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("bulk_grid_n{}", n), |b| {
            b.iter(|| {
                let tree = KdTree::build(rects.iter().copied()).unwrap();
                black_box(tree.count());
            });
        });
        group.bench_function(format!("insert_grid_n{}", n), |b| {
            b.iter_batched(
                KdTree::<f64, u32>::new,
                |mut tree| {
                    for (i, r) in rects.iter().copied() {
                        tree.insert(i, r).unwrap();
                    }
                    black_box(tree.count());
                },
                BatchSize::SmallInput,
            );
        });
    }
    let random = gen_random_rects(20_000, 2000.0, 20.0);
    group.throughput(Throughput::Elements(random.len() as u64));
    group.bench_function("bulk_random_depth_cap_8", |b| {
        b.iter(|| {
            let tree =
                KdTree::build_with(KdConfig::with_max_build_depth(8), random.iter().copied())
                    .unwrap();
            black_box(tree.count());
        });
    });
    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("kdtree_query");
    let rects = gen_random_rects(20_000, 2000.0, 20.0);
    let built = KdTree::build(rects.iter().copied()).unwrap();
    let mut inserted = KdTree::<f64, u32>::new();
    for (i, r) in rects.iter().copied() {
        inserted.insert(i, r).unwrap();
    }
    for (name, tree) in [("built", &built), ("inserted", &inserted)] {
        group.bench_function(format!("region_small_{}", name), |b| {
            b.iter(|| {
                let hits = tree.query(Aabb2D::from_xywh(900.0, 900.0, 60.0, 60.0)).count();
                black_box(hits);
            });
        });
        group.bench_function(format!("region_large_{}", name), |b| {
            b.iter(|| {
                let hits = tree
                    .query(Aabb2D::from_xywh(500.0, 500.0, 800.0, 800.0))
                    .count();
                black_box(hits);
            });
        });
        group.bench_function(format!("nearest_8_{}", name), |b| {
            b.iter(|| {
                let near = tree.nearest(1000.0, 1000.0, 8);
                black_box(near.visited);
            });
        });
    }
    group.finish();
}

fn bench_delete(c: &mut Criterion) {
    let mut group = c.benchmark_group("kdtree_delete");
    let rects = gen_random_rects(5_000, 1000.0, 10.0);
    group.throughput(Throughput::Elements(rects.len() as u64 / 2));
    group.bench_function("lazy_half", |b| {
        b.iter_batched(
            || KdTree::build(rects.iter().copied()).unwrap(),
            |mut tree| {
                for (i, r) in rects.iter().step_by(2) {
                    tree.delete(*i, r).unwrap();
                }
                black_box(tree.dead_count());
            },
            BatchSize::LargeInput,
        );
    });
    group.bench_function("structural_half", |b| {
        b.iter_batched(
            || KdTree::build(rects.iter().copied()).unwrap(),
            |mut tree| {
                for (i, r) in rects.iter().step_by(2) {
                    tree.delete_structural(*i, r).unwrap();
                }
                black_box(tree.count());
            },
            BatchSize::LargeInput,
        );
    });
    group.bench_function("lazy_half_then_rebuild", |b| {
        b.iter_batched(
            || {
                let mut tree = KdTree::build(rects.iter().copied()).unwrap();
                for (i, r) in rects.iter().step_by(2) {
                    tree.delete(*i, r).unwrap();
                }
                tree
            },
            |mut tree| {
                tree.rebuild().unwrap();
                black_box(tree.count());
            },
            BatchSize::LargeInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_build, bench_query, bench_delete);
criterion_main!(benches);
