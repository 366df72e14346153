use std::time::Duration;

use bounded_queue::{BoundedQueue, SnapshotPolicy};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn filled(policy: SnapshotPolicy) -> BoundedQueue<u32> {
    // 100 rounds up to a capacity of 128, and the window wraps
    let mut queue = BoundedQueue::with_policy(100, policy).unwrap();
    queue.extend(0..1_000);
    queue
}

fn queue_iter_benchmark(c: &mut Criterion) {
    let queue = filled(SnapshotPolicy::Disabled);

    c.bench_function("queue_iter_skip", |b| {
        b.iter(|| {
            black_box(&queue)
                .iter()
                .cycle()
                .step_by(103)
                .take(black_box(2048))
                .sum::<u32>()
        });
    });

    c.bench_function("queue_push_evict", |b| {
        let mut queue = filled(SnapshotPolicy::Disabled);
        b.iter(|| queue.push(black_box(7)));
    });
}

fn queue_snapshot_benchmark(c: &mut Criterion) {
    let uncached = filled(SnapshotPolicy::Disabled);
    let cached = filled(SnapshotPolicy::Ttl(Duration::from_secs(60)));

    c.bench_function("queue_snapshot_uncached", |b| {
        b.iter(|| black_box(&uncached).snapshot());
    });
    c.bench_function("queue_snapshot_cached", |b| {
        b.iter(|| black_box(&cached).snapshot());
    });
    c.bench_function("queue_contains_cached", |b| {
        cached.snapshot();
        b.iter(|| black_box(&cached).contains(black_box(&950)));
    });
}

criterion_group!(benches, queue_iter_benchmark, queue_snapshot_benchmark);
criterion_main!(benches);
