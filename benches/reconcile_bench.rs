//! Criterion benchmarks for the merge and aggregation paths

use chrono::{Duration, Local, TimeZone, Utc};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pomosync::services::{Aggregator, Reconciler};
use pomosync::types::{ReportFrequency, SessionKind, SessionRecord};
use std::hint::black_box;

/// `count` sessions, one every 30 minutes, cycling through the kinds
fn sessions(count: usize, id_offset: usize) -> Vec<SessionRecord> {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
    (0..count)
        .map(|i| {
            let n = i + id_offset;
            let kind = SessionKind::ALL[n % SessionKind::ALL.len()];
            SessionRecord {
                id: format!("session-{:08}", n),
                timestamp: base + Duration::minutes(30 * n as i64),
                duration_minutes: match kind {
                    SessionKind::Work => 25,
                    SessionKind::ShortBreak => 5,
                    SessionKind::LongBreak => 15,
                },
                kind,
                owner_id: None,
            }
        })
        .collect()
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");

    for size in [100usize, 1_000, 10_000] {
        // Half of each side overlaps with the other
        let local = sessions(size, 0);
        let remote = sessions(size, size / 2);
        group.throughput(Throughput::Elements((local.len() + remote.len()) as u64));

        group.bench_with_input(
            BenchmarkId::new("merge", size),
            &(local, remote),
            |b, (local, remote)| {
                b.iter(|| Reconciler::merge(black_box(local), black_box(remote)));
            },
        );
    }

    group.finish();
}

fn bench_merge_already_synced(c: &mut Criterion) {
    let local = sessions(5_000, 0);
    let remote = local.clone();

    let mut group = c.benchmark_group("reconcile");
    group.throughput(Throughput::Elements(local.len() as u64));

    group.bench_function("merge_idempotent", |b| {
        b.iter(|| Reconciler::merge(black_box(&local), black_box(&remote)));
    });

    group.finish();
}

fn bench_aggregate(c: &mut Criterion) {
    let all = sessions(10_000, 0);
    let now = Local.from_utc_datetime(&(all[all.len() - 1].timestamp.naive_utc()));

    let mut group = c.benchmark_group("aggregator");
    group.throughput(Throughput::Elements(all.len() as u64));

    group.bench_function("window_monthly", |b| {
        b.iter(|| Aggregator::window(ReportFrequency::Monthly, black_box(&all), &now));
    });

    group.bench_function("daily", |b| {
        b.iter(|| Aggregator::daily(black_box(&all), &Local));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_merge,
    bench_merge_already_synced,
    bench_aggregate
);
criterion_main!(benches);
