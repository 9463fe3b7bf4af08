//! Codec benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use spa_core::{codec, Frame, FrameReassembler, MessageId};

fn status_frame() -> Frame {
    Frame::encode(MessageId::STATUS, &[0x42; 24]).unwrap()
}

fn decode_benchmark(c: &mut Criterion) {
    let frame = status_frame();

    c.bench_function("decode_status", |b| {
        b.iter(|| black_box(codec::decode(black_box(&frame))))
    });
}

fn validate_benchmark(c: &mut Criterion) {
    let raw = status_frame().into_bytes();

    c.bench_function("validate_status", |b| {
        b.iter(|| black_box(Frame::parse(raw.clone()).unwrap()))
    });
}

fn reassembly_benchmark(c: &mut Criterion) {
    let frame = status_frame();
    let stream: Vec<u8> = (0..64).flat_map(|_| frame.as_bytes().iter().copied()).collect();

    c.bench_function("reassemble_64_frames_in_64_byte_reads", |b| {
        b.iter(|| {
            let mut reassembler = FrameReassembler::new();
            let mut count = 0;
            for chunk in stream.chunks(64) {
                reassembler.feed(chunk);
                count += reassembler.drain().count();
            }
            black_box(count)
        })
    });
}

criterion_group!(benches, decode_benchmark, validate_benchmark, reassembly_benchmark);
criterion_main!(benches);
