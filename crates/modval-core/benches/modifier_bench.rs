//! Benchmarks for modifier chain folding and chain mutation.
//!
//! Run with: cargo bench -p modval-core --bench modifier_bench

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

use modval_core::{ModifiableValue, Modifier, Readable};

const CHAIN_LENGTHS: &[usize] = &[1, 8, 64, 512];

fn chain(len: usize) -> ModifiableValue<f64> {
    let value = ModifiableValue::new(100.0);
    for i in 0..len {
        let priority = (i % 7) as i32 - 3;
        let modifier = if i % 2 == 0 {
            Modifier::plus(1.5)
        } else {
            Modifier::times(1.0001)
        };
        value.modifiers().add_at(priority, modifier);
    }
    value
}

// =============================================================================
// Fold
// =============================================================================

fn bench_value_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("modifiable/value");
    for &len in CHAIN_LENGTHS {
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::new("fold", len), &len, |b, &len| {
            let value = chain(len);
            b.iter(|| black_box(value.value()));
        });
    }
    group.finish();
}

// =============================================================================
// Mutation
// =============================================================================

fn bench_add_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("modifiable/mutate");
    for &len in CHAIN_LENGTHS {
        group.bench_with_input(BenchmarkId::new("add_remove", len), &len, |b, &len| {
            let value = chain(len);
            let probe = Modifier::plus(2.0);
            b.iter(|| {
                value.modifiers().add(probe.clone());
                black_box(value.modifiers().remove(&probe));
            });
        });
        group.bench_with_input(BenchmarkId::new("toggle", len), &len, |b, &len| {
            let value = chain(len);
            let probe = Modifier::plus(2.0);
            value.modifiers().add(probe.clone());
            b.iter(|| {
                probe.disable();
                probe.enable();
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_value_read, bench_add_remove);
criterion_main!(benches);
