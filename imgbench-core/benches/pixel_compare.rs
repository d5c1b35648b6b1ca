// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Pixel-equality microbenchmarks.
//!
//! Measures the cost of the lossless check at various image sizes, both for
//! identical images (full scan) and for a mismatch in the last pixel.

use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

use imgbench_core::verify::{compare_images, decode_bytes};

/// Square image edge lengths to benchmark (in pixels).
const EDGES: &[u32] = &[64, 256, 1024];

fn gradient(edge: u32) -> RgbaImage {
    RgbaImage::from_fn(edge, edge, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
    })
}

/// Benchmark comparison of two identical images.
fn bench_compare_identical(c: &mut Criterion) {
    let mut group = c.benchmark_group("compare_identical");
    group.measurement_time(Duration::from_secs(5));

    for &edge in EDGES {
        group.throughput(Throughput::Elements(u64::from(edge) * u64::from(edge)));

        let left = DynamicImage::ImageRgba8(gradient(edge));
        let right = left.clone();

        group.bench_with_input(BenchmarkId::from_parameter(edge), &edge, |b, _| {
            b.iter(|| black_box(compare_images(black_box(&left), black_box(&right))));
        });
    }

    group.finish();
}

/// Benchmark comparison where only the final pixel differs.
fn bench_compare_last_pixel_differs(c: &mut Criterion) {
    let mut group = c.benchmark_group("compare_last_pixel_differs");
    group.measurement_time(Duration::from_secs(5));

    for &edge in EDGES {
        let left = gradient(edge);
        let mut right = left.clone();
        right.put_pixel(edge - 1, edge - 1, Rgba([0, 0, 0, 0]));
        let (left, right) = (DynamicImage::ImageRgba8(left), DynamicImage::ImageRgba8(right));

        group.bench_with_input(BenchmarkId::from_parameter(edge), &edge, |b, _| {
            b.iter(|| black_box(compare_images(&left, &right)));
        });
    }

    group.finish();
}

/// Benchmark PNG decode, which dominates the lossless check in practice.
fn bench_decode_png(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_png");

    for &edge in EDGES {
        let mut encoded = Vec::new();
        gradient(edge)
            .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)
            .expect("Failed to encode PNG");
        group.throughput(Throughput::Bytes(encoded.len() as u64));

        group.bench_with_input(BenchmarkId::from_parameter(edge), &encoded, |b, bytes| {
            b.iter(|| black_box(decode_bytes(bytes, Path::new("bench.png")).ok()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_compare_identical,
    bench_compare_last_pixel_differs,
    bench_decode_png,
);

criterion_main!(benches);
