use criterion::{black_box, criterion_group, criterion_main, Criterion};
use static_huffman::CompressedData;

fn sample(len: usize) -> Vec<u8> {
    let words = ["huffman ", "tree ", "code ", "bit ", "symbol ", "weight ", "leaf "];
    words.iter().cycle().flat_map(|w| w.bytes()).take(len).collect()
}

fn huffman_encode(c: &mut Criterion) {
    let input = sample(64 * 1024);

    c.bench_function("huffman encode 64k", |b| {
        b.iter(|| CompressedData::from_bytes(black_box(&input)))
    });
}

fn huffman_decode(c: &mut Criterion) {
    let input = sample(64 * 1024);
    let (compressed, _) = CompressedData::from_bytes(&input).unwrap();

    c.bench_function("huffman decode 64k", |b| {
        b.iter(|| black_box(&compressed).decode())
    });
}

criterion_group!(benches, huffman_encode, huffman_decode);
criterion_main!(benches);
