//! Performance benchmarks for quotesync-engine

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use quotesync_engine::{merge_snapshot, Change, ChangeLog, ConflictQueue, Quote, QuoteStore};
use std::collections::HashSet;

fn seeded_store(n: usize) -> QuoteStore {
    QuoteStore::from_records(
        (0..n).map(|i| Quote::new(format!("q-{i}"), format!("text {i}"), "bench", i as u64)),
    )
    .expect("ids are unique")
}

fn remote_snapshot(n: usize, ts_offset: u64) -> Vec<Quote> {
    (0..n)
        .map(|i| {
            Quote::new(
                format!("q-{i}"),
                format!("remote text {i}"),
                "bench",
                i as u64 + ts_offset,
            )
        })
        .collect()
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_snapshot");

    for size in [10usize, 100, 1000] {
        // All remote records strictly newer, no dirty ids: worst case for
        // overwrites.
        group.bench_with_input(BenchmarkId::new("remote_wins", size), &size, |b, &size| {
            b.iter_batched(
                || (seeded_store(size), remote_snapshot(size, 1_000_000)),
                |(mut store, remote)| {
                    let mut queue = ConflictQueue::new();
                    merge_snapshot(
                        black_box(&mut store),
                        black_box(remote),
                        &HashSet::new(),
                        &mut queue,
                    )
                },
                criterion::BatchSize::SmallInput,
            )
        });

        // Every id dirty: worst case for conflict queueing.
        group.bench_with_input(
            BenchmarkId::new("all_conflicts", size),
            &size,
            |b, &size| {
                let dirty: HashSet<String> = (0..size).map(|i| format!("q-{i}")).collect();
                b.iter_batched(
                    || (seeded_store(size), remote_snapshot(size, 1_000_000)),
                    |(mut store, remote)| {
                        let mut queue = ConflictQueue::new();
                        merge_snapshot(
                            black_box(&mut store),
                            black_box(remote),
                            &dirty,
                            &mut queue,
                        )
                    },
                    criterion::BatchSize::SmallInput,
                )
            },
        );
    }

    group.finish();
}

fn bench_change_log(c: &mut Criterion) {
    let mut group = c.benchmark_group("change_log");

    group.bench_function("record_distinct_ids", |b| {
        b.iter_batched(
            || {
                (0..1000)
                    .map(|i| Change::add(Quote::new(format!("q-{i}"), "t", "c", i as u64)))
                    .collect::<Vec<_>>()
            },
            |changes| {
                let mut log = ChangeLog::new();
                for change in changes {
                    log.record(change);
                }
                black_box(log)
            },
            criterion::BatchSize::SmallInput,
        )
    });

    group.bench_function("record_coalescing_one_id", |b| {
        b.iter_batched(
            || {
                (0..1000)
                    .map(|i| Change::update(Quote::new("q-0", "t", "c", i as u64)))
                    .collect::<Vec<_>>()
            },
            |changes| {
                let mut log = ChangeLog::new();
                for change in changes {
                    log.record(change);
                }
                black_box(log)
            },
            criterion::BatchSize::SmallInput,
        )
    });

    group.finish();
}

fn bench_store_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_codec");

    let store = seeded_store(1000);
    let json = store.to_json().expect("serializable");

    group.bench_function("to_json_1000", |b| {
        b.iter(|| black_box(&store).to_json().unwrap())
    });

    group.bench_function("from_json_1000", |b| {
        b.iter(|| QuoteStore::from_json(black_box(&json)).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_merge, bench_change_log, bench_store_codec);
criterion_main!(benches);
