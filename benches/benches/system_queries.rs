// Copyright 2025 the Overlap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Point, Vec2};
use overlap::{BodyOptions, System};

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

fn l_shape(size: f64) -> Vec<Vec2> {
    [
        (0.0, 0.0),
        (4.0, 0.0),
        (4.0, 1.0),
        (1.0, 1.0),
        (1.0, 4.0),
        (0.0, 4.0),
    ]
    .iter()
    .map(|&(x, y)| Vec2::new(x * size, y * size))
    .collect()
}

fn populate(count: usize, extent: f64) -> System {
    let mut rng = Rng::new(0xC1A5_7E55_9999_ABCD);
    let mut system = System::new();
    let opts = BodyOptions::default().with_padding(2.0);
    let l = l_shape(3.0);
    for i in 0..count {
        let pos = Point::new(rng.next_f64() * extent, rng.next_f64() * extent);
        match i % 3 {
            0 => {
                system.create_circle(pos, 4.0 + rng.next_f64() * 6.0, &opts);
            }
            1 => {
                system.create_box(pos, 8.0, 6.0, &opts.with_angle(rng.next_f64()));
            }
            _ => {
                let _ = system.create_polygon(pos, &l, &opts);
            }
        }
    }
    system
}

fn bench_check_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("check_all");
    for &n in &[256usize, 1024] {
        let system = populate(n, 1200.0);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("mixed_n{}", n), |b| {
            b.iter(|| {
                let mut hits = 0_usize;
                system.check_all(|_| {
                    hits += 1;
                    false
                });
                black_box(hits);
            });
        });
    }
    group.finish();
}

fn bench_separate(c: &mut Criterion) {
    let mut group = c.benchmark_group("separate");
    group.bench_function("mixed_n1024", |b| {
        let mut system = populate(1024, 1200.0);
        b.iter(|| {
            system.separate(|_| true);
            black_box(system.len());
        });
    });
    group.finish();
}

fn bench_raycast(c: &mut Criterion) {
    let mut group = c.benchmark_group("raycast");
    group.bench_function("mixed_n1024", |b| {
        let mut system = populate(1024, 1200.0);
        let mut rng = Rng::new(0xFACE_FEED_CAFE_BABE);
        b.iter(|| {
            let start = Point::new(rng.next_f64() * 1200.0, 0.0);
            let end = Point::new(rng.next_f64() * 1200.0, 1200.0);
            black_box(system.raycast(start, end, |_, _| true));
        });
    });
    group.finish();
}

criterion_group!(benches, bench_check_all, bench_separate, bench_raycast);
criterion_main!(benches);
