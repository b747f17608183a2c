// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::time::Duration;

use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use understory_windowing::{
    EngineOptions, ExtentModel, ItemSize, ManualClock, PositionIndex, ScrollAlign, WindowEngine,
    compute_visible_range, find_index_at_offset,
};

#[derive(Clone)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u32(&mut self) -> u32 {
        // Numerical Recipes LCG parameters.
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 32) as u32
    }

    fn next_f64(&mut self, upper: f64) -> f64 {
        f64::from(self.next_u32()) / f64::from(u32::MAX) * upper
    }
}

fn variable_sizes() -> ItemSize {
    ItemSize::variable(|i| 24.0 + ((i * 7919) % 5) as f64 * 12.0)
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("windowing/build");
    for &len in &[10_000_usize, 100_000, 1_000_000] {
        group.bench_function(BenchmarkId::new("fixed", len), |b| {
            let sizing = ItemSize::Fixed(24.0);
            b.iter(|| black_box(PositionIndex::build(len, &sizing)));
        });
        group.bench_function(BenchmarkId::new("variable", len), |b| {
            let sizing = variable_sizes();
            b.iter(|| black_box(PositionIndex::build(len, &sizing)));
        });
    }
    group.finish();
}

fn bench_locate(c: &mut Criterion) {
    let len = 1_000_000;
    let fixed = PositionIndex::build(len, &ItemSize::Fixed(24.0));
    let variable = PositionIndex::build(len, &variable_sizes());

    let mut group = c.benchmark_group("windowing/locate");
    for (name, index) in [("fixed", &fixed), ("variable", &variable)] {
        let total = index.total_extent();
        group.bench_function(BenchmarkId::new("find_index_at_offset", name), |b| {
            let mut rng = Lcg::new(7);
            b.iter(|| black_box(find_index_at_offset(index, rng.next_f64(total))));
        });
        group.bench_function(BenchmarkId::new("compute_visible_range", name), |b| {
            let mut rng = Lcg::new(11);
            b.iter(|| black_box(compute_visible_range(index, rng.next_f64(total), 900.0, 10)));
        });
    }
    group.finish();
}

fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("windowing/engine");

    group.bench_function("on_scroll_fling", |b| {
        b.iter_batched(
            || {
                let clock = ManualClock::new();
                let engine = WindowEngine::with_clock(
                    EngineOptions::new(100_000, variable_sizes(), 900.0),
                    clock.clone(),
                );
                (engine, clock)
            },
            |(mut engine, clock)| {
                let mut offset = 0.0;
                for _ in 0..120 {
                    clock.advance(Duration::from_millis(16));
                    offset += 480.0;
                    engine.on_scroll(offset);
                }
                black_box(engine.get_state())
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("scroll_to_index", |b| {
        let clock = ManualClock::new();
        let mut engine =
            WindowEngine::with_clock(EngineOptions::new(100_000, variable_sizes(), 900.0), clock);
        let mut rng = Lcg::new(3);
        b.iter(|| {
            let index = rng.next_u32() as usize % 100_000;
            black_box(engine.scroll_to_index(index, ScrollAlign::Center))
        });
    });

    group.finish();
}

criterion_group!(benches, bench_build, bench_locate, bench_engine);
criterion_main!(benches);
