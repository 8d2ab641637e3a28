#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! Criterion benchmarks for selection and composite binding
//!
//! Selection runs on every request before any signing starts, so its cost
//! adds directly to the caller's budget.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use esig_core::{AlgorithmCatalog, EngineConfig, SelectionConstraints, Selector, composite, seed};

fn bench_selection(c: &mut Criterion) {
    let Ok(catalog) = AlgorithmCatalog::from_profiles(seed::all_profiles()) else {
        return;
    };
    let selector = Selector::new(Arc::new(catalog), &EngineConfig::default());

    let mut group = c.benchmark_group("select");
    for target in &[0.5, 5.0, 50.0, 500.0] {
        group.bench_with_input(BenchmarkId::from_parameter(target), target, |b, &target| {
            let constraints = SelectionConstraints::new(target).with_allow_simulated(true);
            b.iter(|| black_box(selector.select(black_box(&constraints))));
        });
    }
    group.finish();

    c.bench_function("select_speed_first", |b| {
        let constraints = SelectionConstraints::new(50.0).with_prioritize_speed(true);
        b.iter(|| black_box(selector.select(&constraints)));
    });
}

fn bench_composite(c: &mut Criterion) {
    let signatures: Vec<(String, Vec<u8>)> =
        (0..8).map(|i| (format!("ALG-{i}"), vec![i as u8; 3309])).collect();
    let message = vec![0x5Au8; 1024];

    let mut group = c.benchmark_group("composite_bind");
    for count in &[1usize, 4, 8] {
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter(|| {
                let pairs = signatures.iter().take(count).map(|(n, s)| (n.as_str(), s.as_slice()));
                black_box(composite::bind(pairs, black_box(&message)))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_selection, bench_composite);
criterion_main!(benches);
