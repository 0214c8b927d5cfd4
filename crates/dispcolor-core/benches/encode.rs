//! Encoder and Comparison Benchmarks
//!
//! The LUT encoders and the readback equality kernel run once per commit on
//! tables of up to 262145 entries.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use dispcolor_core::codec::{CoeffFormat, encode_ctm_for};
use dispcolor_core::{
    ColorConfig, Ctm, HardwareProfile, LutEntry, LutShape, Pipe, Platform, approx_equal,
    encode_lut, plan_commit,
};

/// BT.709 to BT.2020 primaries
const BT709_TO_BT2020: [[f64; 3]; 3] = [
    [0.6274, 0.3293, 0.0433],
    [0.0691, 0.9195, 0.0114],
    [0.0164, 0.0880, 0.8956],
];

/// sRGB-like decode curve
fn generate_lut(size: usize) -> Vec<LutEntry> {
    (0..size)
        .map(|i| {
            let x = i as f64 / (size - 1) as f64;
            let y = if x <= 0.04045 {
                x / 12.92
            } else {
                ((x + 0.055) / 1.055).powf(2.4)
            };
            LutEntry::gray((y * 65535.0 + 0.5) as u16)
        })
        .collect()
}

// ============================================================================
// CTM Encoding Benchmarks
// ============================================================================

fn bench_ctm(c: &mut Criterion) {
    let mut group = c.benchmark_group("ctm_encode");
    let ctm = Ctm::from_rows(BT709_TO_BT2020);

    group.bench_function("sliding_window", |b| {
        b.iter(|| encode_ctm_for(black_box(&ctm), CoeffFormat::SlidingWindow, false))
    });
    group.bench_function("sliding_window_limited", |b| {
        b.iter(|| encode_ctm_for(black_box(&ctm), CoeffFormat::SlidingWindow, true))
    });
    group.bench_function("s3_12", |b| {
        b.iter(|| encode_ctm_for(black_box(&ctm), CoeffFormat::S3Fixed12, false))
    });

    group.finish();
}

// ============================================================================
// LUT Encoding Benchmarks
// ============================================================================

fn bench_lut_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("lut_encode");

    let shapes = [
        ("legacy8", 256, LutShape::Legacy8),
        ("interpolated10p6", 129, LutShape::Interpolated10p6 { entries: 129 }),
        ("indexed10_resample", 512, LutShape::indexed10()),
        ("split_upper", 1024, LutShape::split_upper()),
        ("multi_segment", 262145, LutShape::MultiSegment12p4),
    ];

    for (name, size, shape) in shapes {
        let lut = generate_lut(size);
        group.throughput(Throughput::Elements(shape.hw_entries() as u64));
        group.bench_with_input(BenchmarkId::new(name, size), &lut, |b, lut| {
            b.iter(|| encode_lut(black_box(lut), shape))
        });
    }

    group.finish();
}

// ============================================================================
// Equality Benchmarks
// ============================================================================

fn bench_equality(c: &mut Criterion) {
    let mut group = c.benchmark_group("lut_equal");

    for size in [256, 1024, 262145] {
        let a = generate_lut(size);
        let b = a.clone();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("approx_equal", size), &size, |bench, _| {
            bench.iter(|| approx_equal(black_box(&a), black_box(&b), 10))
        });
    }

    group.finish();
}

// ============================================================================
// Full Commit Planning
// ============================================================================

fn bench_plan(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan_commit");

    let cases = [
        (
            "skl_split",
            Platform::Skylake,
            ColorConfig::new()
                .with_degamma(generate_lut(512))
                .with_ctm(Ctm::from_rows(BT709_TO_BT2020))
                .with_gamma(generate_lut(512)),
        ),
        (
            "icl_multi_segment",
            Platform::Icelake,
            ColorConfig::new()
                .with_degamma(generate_lut(33))
                .with_gamma(generate_lut(262145)),
        ),
        ("chv_legacy", Platform::Cherryview, ColorConfig::new().with_gamma(generate_lut(256))),
    ];

    for (name, platform, config) in cases {
        let profile = HardwareProfile::for_platform(platform);
        group.bench_function(name, |b| {
            b.iter(|| plan_commit(black_box(&config), profile, Pipe::A, None))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_ctm, bench_lut_encode, bench_equality, bench_plan);
criterion_main!(benches);
