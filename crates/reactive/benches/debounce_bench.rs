//! Benchmarks for gqlbind-reactive using criterion.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gqlbind_client::mock::MockClient;
use gqlbind_core::Value;
use gqlbind_reactive::{Apollo, Debouncer, Host, ManualTimers, MemoryHost, QueryOptions};

fn debouncer_schedule_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("debouncer_schedule");

    for keys in [1usize, 16, 256].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(keys), keys, |b, &keys| {
            let names: Vec<String> = (0..keys).map(|i| format!("vars:q{}", i)).collect();
            b.iter(|| {
                let timers = ManualTimers::new();
                let debouncer = Debouncer::new(timers.clone());
                for round in 0..1000 {
                    debouncer.schedule(&names[round % keys], 0, || {});
                }
                timers.run_until_idle();
                black_box(debouncer.pending_count())
            });
        });
    }

    group.finish();
}

fn variable_burst_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("variable_burst");

    for queries in [1usize, 10, 100].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(queries), queries, |b, &queries| {
            b.iter(|| {
                let host = MemoryHost::new();
                let client = MockClient::new();
                let timers = ManualTimers::new();
                let apollo = Apollo::new(host.clone(), client.clone(), timers.clone());
                for i in 0..queries {
                    apollo
                        .process(
                            &format!("q{}", i),
                            QueryOptions::new("{ feed }").variable("id", "feedId"),
                        )
                        .unwrap();
                }
                apollo.process_observers();

                for id in 0..100 {
                    host.set("feedId", Value::from(id));
                }
                timers.run_until_idle();
                black_box(client.watch_count())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, debouncer_schedule_benchmark, variable_burst_benchmark);
criterion_main!(benches);
