// Pipeline Benchmarks
// Performance benchmarks for the per-tick pipeline paths

use criterion::{criterion_group, criterion_main, Criterion};
use fbpipe::memory::greyscale_palette;
use fbpipe::pipeline::{DisplayInputs, Framebuffer, PipelineConfig, WriteRequest};
use fbpipe::sim::Scheduler;
use fbpipe::timing::DisplayTiming;
use std::hint::black_box;

/// Helper function to create the default 160x120, 4x scaled pipeline
fn create_framebuffer() -> (Framebuffer, PipelineConfig) {
    let config = PipelineConfig::default();
    let palette = greyscale_palette(config.cidx_bits, config.chan_bits);
    let fb = Framebuffer::new(config.clone(), vec![0; config.pixels()], palette)
        .expect("Failed to build framebuffer");
    (fb, config)
}

/// Benchmark a full displayed frame through the scheduler
/// This is the main performance-critical path
fn bench_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame");
    group.sample_size(10); // A 640x480 frame is over a million edges

    group.bench_function("vga_frame_via_scheduler", |b| {
        let (fb, config) = create_framebuffer();
        let timing = DisplayTiming::for_pipeline(&config, 160, 45).expect("Failed to build timing");
        let mut sched = Scheduler::new(fb, timing, 2, 1).expect("Failed to build scheduler");

        b.iter(|| {
            black_box(sched.run_frame());
        });
    });

    group.finish();
}

/// Benchmark single ticks in each domain
fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");

    group.bench_function("compute_idle", |b| {
        let (mut fb, _) = create_framebuffer();
        b.iter(|| {
            black_box(fb.tick_compute(WriteRequest::IDLE));
        });
    });

    group.bench_function("compute_write", |b| {
        let (mut fb, _) = create_framebuffer();
        let mut i = 0i32;
        b.iter(|| {
            i = (i + 1) % 160;
            black_box(fb.tick_compute(black_box(WriteRequest::new(i, 60, 7))));
        });
    });

    group.bench_function("display_active", |b| {
        let (mut fb, _) = create_framebuffer();
        let inputs = DisplayInputs {
            de: true,
            frame: false,
            line: false,
        };
        b.iter(|| {
            black_box(fb.tick_display(black_box(inputs)));
        });
    });

    group.finish();
}

/// Benchmark write throughput, one admitted per compute tick
fn bench_writes(c: &mut Criterion) {
    let mut group = c.benchmark_group("writes");

    group.bench_function("fill_160x120", |b| {
        let (mut fb, _) = create_framebuffer();
        b.iter(|| {
            for y in 0..120 {
                for x in 0..160 {
                    fb.tick_compute(WriteRequest::new(x, y, 3));
                }
            }
            black_box(fb.pixel(159, 119));
        });
    });

    group.finish();
}

criterion_group!(benches, bench_frame, bench_tick, bench_writes);
criterion_main!(benches);
