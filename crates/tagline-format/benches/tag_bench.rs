//! Benchmarks for tag decoding, encoding, and unsynchronisation.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tagline_format::bytes::{unsync_decode, unsync_encode};
use tagline_format::{Frame, Tag, Value, Version};

/// A tag with the usual text frames, a few comments and a cover picture
/// of `picture_size` bytes.
fn sample_tag(version: Version, picture_size: usize) -> Tag {
    let mut tag = Tag::new(version);
    for (name, value) in [
        ("title", "Benchmark Title"),
        ("artist", "First Artist / Second Artist"),
        ("album", "Benchmark Album"),
        ("track", "7"),
        ("track-total", "12"),
        ("date", "2009-06-21 18:30"),
        ("genre", "Electronic"),
        ("comment", "Recorded live"),
    ] {
        tag.set_friendly(name, value).unwrap();
    }

    let picture: Vec<u8> = [0xFF, 0xD8, 0xFF]
        .into_iter()
        .chain((0..picture_size).map(|i| (i % 251) as u8))
        .collect();
    let (id, format_field, format) = match version {
        Version::V2_2 => ("PIC", "format", "JPG"),
        _ => ("APIC", "mime", "image/jpeg"),
    };
    let frame = Frame::new(id)
        .unwrap()
        .with(format_field, Value::Text(format.into()))
        .unwrap()
        .with("type", Value::Int(3))
        .unwrap()
        .with("desc", Value::Text(String::new()))
        .unwrap()
        .with("data", Value::Binary(picture))
        .unwrap();
    tag.set(frame);
    tag
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("tag_encode");
    for version in [Version::V2_2, Version::V2_3, Version::V2_4] {
        let tag = sample_tag(version, 64 * 1024);
        group.bench_with_input(BenchmarkId::new("version", version), &tag, |b, tag| {
            b.iter(|| black_box(tag.encode(None).unwrap()));
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("tag_decode");
    for version in [Version::V2_2, Version::V2_3, Version::V2_4] {
        let data = sample_tag(version, 64 * 1024).encode(None).unwrap();
        group.bench_with_input(BenchmarkId::new("version", version), &data, |b, data| {
            b.iter(|| black_box(Tag::decode(black_box(data)).unwrap()));
        });
    }
    group.finish();
}

fn bench_unsync(c: &mut Criterion) {
    let mut group = c.benchmark_group("unsync");
    for size in [1024usize, 65536, 1_048_576] {
        // Dense in 0xFF so the encoder has work to do.
        let data: Vec<u8> = (0..size).map(|i| if i % 3 == 0 { 0xFF } else { (i % 256) as u8 }).collect();
        let encoded = unsync_encode(&data);
        group.bench_with_input(BenchmarkId::new("encode", size), &data, |b, data| {
            b.iter(|| black_box(unsync_encode(black_box(data))));
        });
        group.bench_with_input(BenchmarkId::new("decode", size), &encoded, |b, encoded| {
            b.iter(|| black_box(unsync_decode(black_box(encoded))));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode, bench_unsync);
criterion_main!(benches);
