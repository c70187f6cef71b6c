use chrono::NaiveDate;
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use occurrence_engine::{find_adjacent, occurs_on, Pattern, ScheduleAnchor};

fn anchor() -> ScheduleAnchor {
    let day = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
    ScheduleAnchor::new(
        day.and_hms_opt(9, 0, 0).unwrap(),
        day.and_hms_opt(10, 0, 0).unwrap(),
    )
}

fn bench_find_adjacent(c: &mut Criterion) {
    let anchor = anchor();
    let now = NaiveDate::from_ymd_opt(2026, 9, 15)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();

    let mut group = c.benchmark_group("find_adjacent");
    for text in ["daily:1", "weekly:2", "monthly:1", "weekdays:1", "custom:1:1,3,5"] {
        let pattern = Pattern::parse(text).unwrap();
        group.bench_function(text, |b| {
            b.iter(|| find_adjacent(black_box(&anchor), Some(black_box(&pattern)), black_box(now)))
        });
    }
    group.finish();
}

fn bench_occurs_on(c: &mut Criterion) {
    let anchor = anchor();
    let pattern = Pattern::parse("custom:1:1,3,5").unwrap();
    let target = NaiveDate::from_ymd_opt(2026, 11, 4).unwrap();
    c.bench_function("occurs_on custom", |b| {
        b.iter(|| occurs_on(black_box(&anchor), Some(black_box(&pattern)), black_box(target)))
    });
}

criterion_group!(benches, bench_find_adjacent, bench_occurs_on);
criterion_main!(benches);
