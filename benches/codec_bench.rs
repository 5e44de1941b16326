use criterion::{black_box, criterion_group, criterion_main, Criterion};
use eltlink::codec;
use eltlink::model::PositionRecord;

fn bench_encode(c: &mut Criterion) {
    let record = PositionRecord::new(43.79560, -79.35051);
    c.bench_function("frame_encode", |b| b.iter(|| codec::encode(black_box(&record))));
}

fn bench_decode(c: &mut Criterion) {
    let frame = codec::encode(&PositionRecord::new(43.79560, -79.35051));
    c.bench_function("frame_decode", |b| b.iter(|| codec::decode(black_box(&frame))));
}

fn bench_decode_rejected(c: &mut Criterion) {
    let packet = [0u8; 12];
    c.bench_function("frame_decode_wrong_length", |b| {
        b.iter(|| codec::decode(black_box(&packet)))
    });
}

criterion_group!(benches, bench_encode, bench_decode, bench_decode_rejected);
criterion_main!(benches);
