//! # Subject-Bus Registry Benchmarks
//!
//! Resolve and dispatch cost per storage strategy:
//!
//! | Strategy | Lookup | Expectation |
//! |----------|--------|-------------|
//! | identity-tag | hashed by address | flat as subjects grow |
//! | linear-scan | identity scan | linear in subject count |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use std::time::Duration;
use subject_bus::{BusConfig, EventBus, ListenOptions, StorageStrategy, Subject};

const STRATEGIES: [StorageStrategy; 2] =
    [StorageStrategy::IdentityTag, StorageStrategy::LinearScan];

fn populated_bus(strategy: StorageStrategy, subjects: usize) -> (EventBus<u64>, Vec<Arc<usize>>) {
    let bus = EventBus::with_config(BusConfig::default().with_storage_strategy(strategy))
        .expect("valid config");
    let objects: Vec<Arc<usize>> = (0..subjects).map(Arc::new).collect();
    for object in &objects {
        bus.listen(
            Some(&Subject::object(object)),
            Some("tick"),
            |v: &u64| {
                black_box(v);
                Ok(())
            },
            ListenOptions::default(),
        )
        .expect("listen");
    }
    (bus, objects)
}

// ============================================================================
// Resolve: notify the last-registered subject
// ============================================================================

fn bench_resolve_by_subject_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");
    group.measurement_time(Duration::from_secs(5));

    for size in [10, 100, 1_000, 5_000] {
        for strategy in STRATEGIES {
            let (bus, objects) = populated_bus(strategy, size);
            let target = Subject::object(objects.last().expect("non-empty"));

            group.throughput(Throughput::Elements(1));
            group.bench_with_input(BenchmarkId::new(strategy.as_str(), size), &size, |b, _| {
                b.iter(|| bus.notify(Some(black_box(&target)), Some("tick"), 1))
            });
        }
    }

    group.finish();
}

// ============================================================================
// Dispatch: one subject, many subscribers
// ============================================================================

fn bench_dispatch_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");

    for subscribers in [1, 16, 256] {
        let bus: EventBus<u64> = EventBus::new();
        for i in 0..subscribers {
            bus.listen(
                None,
                Some("fan"),
                |v: &u64| {
                    black_box(v);
                    Ok(())
                },
                ListenOptions::default().with_identity(format!("s{i}")),
            )
            .expect("listen");
        }

        group.throughput(Throughput::Elements(subscribers as u64));
        group.bench_with_input(
            BenchmarkId::new("fan_out", subscribers),
            &subscribers,
            |b, _| b.iter(|| bus.notify(None, Some("fan"), black_box(7))),
        );
    }

    group.finish();
}

// ============================================================================
// Registration: listen + unlisten churn
// ============================================================================

fn bench_listen_unlisten(c: &mut Criterion) {
    let mut group = c.benchmark_group("registration");

    for strategy in STRATEGIES {
        let (bus, objects) = populated_bus(strategy, 100);
        let subject = Subject::object(&objects[50]);

        group.bench_function(BenchmarkId::new("listen_unlisten", strategy.as_str()), |b| {
            b.iter(|| {
                bus.listen(
                    Some(&subject),
                    Some("churn"),
                    |_: &u64| Ok(()),
                    ListenOptions::default()
                        .with_identity("churn")
                        .call_if_already_notified(false),
                )
                .expect("listen");
                bus.unlisten(
                    Some(&subject),
                    Some("churn"),
                    subject_bus::UnlistenOptions::default().with_identity("churn"),
                )
                .expect("unlisten")
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_resolve_by_subject_count,
    bench_dispatch_fan_out,
    bench_listen_unlisten
);
criterion_main!(benches);
