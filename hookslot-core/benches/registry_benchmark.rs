use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

use hookslot_core::{CollectingSink, Handler, HandlerRegistry, HandlerSlot, SlotLimits};

fn handlers(n: usize) -> Vec<Handler<u64>> {
    (0..n)
        .map(|_| {
            Handler::new(|v: &u64| {
                black_box(v);
            })
        })
        .collect()
}

fn filled(units: &[Handler<u64>]) -> HandlerSlot<u64> {
    HandlerSlot::compose(units.iter().cloned(), SlotLimits::UNBOUNDED)
        .expect("unbounded compose")
}

fn bench_add_if_absent(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_if_absent");

    for size in [1usize, 8, 64, 512] {
        let units = handlers(size);
        let extra = handlers(1).remove(0);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("fresh", size), &units, |b, units| {
            b.iter(|| {
                let mut slot = filled(units);
                HandlerRegistry::add_if_absent(&mut slot, extra.clone(), None);
                black_box(slot.len())
            });
        });

        group.bench_with_input(BenchmarkId::new("duplicate", size), &units, |b, units| {
            let last = units[units.len() - 1].clone();
            b.iter(|| {
                let mut slot = filled(units);
                let mut sink = CollectingSink::new();
                HandlerRegistry::add_if_absent(&mut slot, last.clone(), Some(&mut sink));
                black_box(sink.len())
            });
        });
    }

    group.finish();
}

fn bench_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("remove");

    for size in [8usize, 64, 512] {
        let units = handlers(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("middle", size), &units, |b, units| {
            let middle = units[units.len() / 2].clone();
            b.iter(|| {
                let mut slot = filled(units);
                HandlerRegistry::remove_if_exists(&mut slot, &middle, None);
                black_box(slot.len())
            });
        });

        group.bench_with_input(BenchmarkId::new("all", size), &units, |b, units| {
            b.iter(|| {
                let mut slot = filled(units);
                HandlerRegistry::remove_all(&mut slot, None);
                black_box(slot.is_empty())
            });
        });
    }

    group.finish();
}

fn bench_invoke(c: &mut Criterion) {
    let mut group = c.benchmark_group("invoke");

    for size in [1usize, 8, 64, 512] {
        let slot = filled(&handlers(size));
        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            b.iter(|| black_box(slot.invoke(black_box(&42))));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_add_if_absent, bench_remove, bench_invoke);
criterion_main!(benches);
