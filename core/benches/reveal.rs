use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use unveil_core::*;

fn hidden() -> PixelBuffer {
    PixelBuffer::from_fn(SURFACE_SIZE, SURFACE_SIZE, |x, y| {
        Rgb::new((x % 251) as u8, (y % 241) as u8, ((x ^ y) % 256) as u8)
    })
}

fn rms_color(c: &mut Criterion) {
    let hidden = hidden();
    let mut group = c.benchmark_group("rms_color");
    for size in [64, 256, 512] {
        group.bench_function(format!("{size}px"), |b| {
            b.iter(|| hidden.rms_color(black_box(PixelRect::square(size))))
        });
    }
    group.finish();
}

fn full_subdivision(c: &mut Criterion) {
    let hidden = hidden();
    c.bench_function("full_subdivision", |b| {
        b.iter(|| {
            let mut surface = PixelBuffer::new(SURFACE_SIZE, SURFACE_SIZE);
            let mut engine = RevealEngine::seed(&hidden, &mut surface).unwrap();
            while let Some(span) = engine.spans().first().copied() {
                engine.resolve(span, &hidden, &mut surface).unwrap();
            }
            surface
        })
    });
}

fn snapshot_capture(c: &mut Criterion) {
    let hidden = hidden();
    c.bench_function("snapshot_capture", |b| {
        b.iter(|| Snapshot::capture(black_box(&hidden)).unwrap())
    });
}

criterion_group!(benches, rms_color, full_subdivision, snapshot_capture);
criterion_main!(benches);
