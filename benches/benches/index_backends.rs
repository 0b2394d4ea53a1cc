// Copyright 2025 the Overlap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use overlap_index::{Aabb2D, Index};

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

fn gen_random_rects(count: usize, extent: f64, size: f64) -> Vec<Aabb2D<f64>> {
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    (0..count)
        .map(|_| {
            let x0 = rng.next_f64() * (extent - size).max(1.0);
            let y0 = rng.next_f64() * (extent - size).max(1.0);
            Aabb2D::<f64>::from_xywh(x0, y0, size, size)
        })
        .collect()
}

fn bench_insert_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_query");
    for &n in &[32usize, 64] {
        let rects = gen_grid_rects(n, 10.0);
        let probe = Aabb2D::<f64>::from_xywh(100.0, 100.0, 200.0, 200.0);
        group.throughput(Throughput::Elements((n * n) as u64));
        group.bench_function(format!("flatvec_n{}", n), |b| {
            b.iter_batched(
                Index::<f64, u32>::new,
                |mut idx| {
                    for (i, r) in rects.iter().copied().enumerate() {
                        let _ = idx.insert(r, i as u32);
                    }
                    black_box(idx.query_rect(probe).count());
                },
                BatchSize::SmallInput,
            )
        });
        group.bench_function(format!("rtree_n{}", n), |b| {
            b.iter_batched(
                Index::<f64, u32>::with_rtree,
                |mut idx| {
                    for (i, r) in rects.iter().copied().enumerate() {
                        let _ = idx.insert(r, i as u32);
                    }
                    black_box(idx.query_rect(probe).count());
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_frame_churn(c: &mut Criterion) {
    // Every entry moves a little each frame, the way bodies do in a game loop.
    let mut group = c.benchmark_group("frame_churn");
    let rects = gen_random_rects(4096, 2000.0, 12.0);
    group.throughput(Throughput::Elements(rects.len() as u64));
    group.bench_function("rtree_update_4096", |b| {
        let mut idx = Index::<f64, u32>::with_rtree();
        let keys: Vec<_> = rects
            .iter()
            .copied()
            .enumerate()
            .map(|(i, r)| idx.insert(r, i as u32))
            .collect();
        let mut frame = 0.0_f64;
        b.iter(|| {
            frame += 1.0;
            let dx = frame.sin() * 3.0;
            for (k, r) in keys.iter().zip(&rects) {
                let moved = Aabb2D::new(r.min_x + dx, r.min_y, r.max_x + dx, r.max_y);
                idx.update(*k, moved);
            }
            black_box(idx.take_damage().len());
        });
    });
    group.bench_function("rtree_remove_insert_4096", |b| {
        let mut idx = Index::<f64, u32>::with_rtree();
        let mut keys: Vec<_> = rects
            .iter()
            .copied()
            .enumerate()
            .map(|(i, r)| idx.insert(r, i as u32))
            .collect();
        b.iter(|| {
            for (i, k) in keys.iter_mut().enumerate() {
                let _ = idx.remove(*k);
                *k = idx.insert(rects[i], i as u32);
            }
            black_box(idx.len());
        });
    });
    group.finish();
}

criterion_group!(benches, bench_insert_query, bench_frame_churn);
criterion_main!(benches);
