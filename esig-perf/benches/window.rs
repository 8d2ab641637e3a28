#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

//! Criterion benchmarks for timing windows
//!
//! Every successful signing task pushes one sample, so recording must stay
//! negligible next to the cheapest signature (HMAC, tens of microseconds).

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use esig_perf::{SampleWindow, Stopwatch};
use std::hint::black_box;

fn bench_stopwatch(c: &mut Criterion) {
    c.bench_function("stopwatch_elapsed_ms", |b| {
        b.iter(|| {
            let watch = Stopwatch::start();
            black_box(watch.elapsed_ms());
        });
    });
}

fn bench_window(c: &mut Criterion) {
    let mut group = c.benchmark_group("window_push");
    for capacity in &[10usize, 100, 1000] {
        group.bench_with_input(BenchmarkId::from_parameter(capacity), capacity, |b, &capacity| {
            let mut window = SampleWindow::new(capacity);
            let mut sample = 0.0;
            b.iter(|| {
                sample += 0.25;
                black_box(window.push(black_box(sample)));
            });
        });
    }
    group.finish();

    c.bench_function("window_statistics_100", |b| {
        let mut window = SampleWindow::default();
        for i in 0..100 {
            window.push(f64::from(i));
        }
        b.iter(|| black_box(window.statistics()));
    });
}

criterion_group!(benches, bench_stopwatch, bench_window);
criterion_main!(benches);
