use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use chrono::Weekday;
use meeter_engine::aggregate::aggregate;
use meeter_engine::grid::{TimeGrid, DAYS};
use meeter_engine::search::{best_windows, SearchConstraints};

/// Twenty members with staggered weekly patterns and a few full days each.
fn member_grids() -> Vec<TimeGrid> {
    let weekdays = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
    ];
    (0..20)
        .map(|i| {
            let mut grid = TimeGrid::new(format!("member{i}"));
            let weekday = weekdays[i % weekdays.len()];
            let start = 16 + (i % 6);
            grid.set_weekly(Weekday::Mon, weekday, start, start + 12, true)
                .unwrap();
            for day in (i % 7..DAYS).step_by(11) {
                grid.set_day(day, true).unwrap();
            }
            grid
        })
        .collect()
}

fn bench_aggregate(c: &mut Criterion) {
    let grids = member_grids();
    c.bench_function("aggregate_20_members", |b| {
        b.iter(|| aggregate(black_box(&grids)).unwrap())
    });
}

fn bench_search(c: &mut Criterion) {
    let counts = aggregate(&member_grids()).unwrap();
    let constraints = SearchConstraints::unbounded(6);
    c.bench_function("best_windows_top3", |b| {
        b.iter(|| best_windows(black_box(&counts), black_box(&constraints), 3))
    });
    c.bench_function("best_windows_top50", |b| {
        b.iter(|| best_windows(black_box(&counts), black_box(&constraints), 50))
    });
}

criterion_group!(benches, bench_aggregate, bench_search);
criterion_main!(benches);
