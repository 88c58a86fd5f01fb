use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use deflate_bridge_core::prelude::*;

fn corpus(len: usize) -> Vec<u8> {
    b"Lorem ipsum dolor sit amet, consectetur adipiscing elit. "
        .iter()
        .cycle()
        .take(len)
        .copied()
        .collect()
}

// Heap views pay a staging copy per call; fixed views do not. This shows the gap.
fn bench_crc32_by_origin(c: &mut Criterion) {
    let mut group = c.benchmark_group("crc32");
    for len in [1024usize, 64 * 1024, 1024 * 1024] {
        let data = corpus(len);
        group.throughput(Throughput::Bytes(len as u64));
        group.bench_with_input(BenchmarkId::new("fixed", len), &data, |b, data| {
            b.iter(|| crc32(0, &mut Region::whole(FixedBuffer::from_slice(black_box(data)))))
        });
        group.bench_with_input(BenchmarkId::new("heap", len), &data, |b, data| {
            b.iter(|| crc32(0, &mut Region::whole(HeapBuffer::new(black_box(data.as_slice())))))
        });
    }
    group.finish();
}

fn bench_compress_levels(c: &mut Criterion) {
    let data = corpus(256 * 1024);
    let mut group = c.benchmark_group("compress_gzip");
    group.throughput(Throughput::Bytes(data.len() as u64));
    for level in [1, 6, 12] {
        let mut handle = CompressorHandle::create(level).unwrap();
        let mut out = vec![0u8; handle.compress_bound(Format::Gzip, data.len())];
        group.bench_function(BenchmarkId::from_parameter(level), |b| {
            b.iter(|| {
                let mut src = Region::whole(FixedBuffer::from_slice(&data));
                let mut dst = Region::whole(FixedBuffer::from_mut_slice(&mut out));
                compress(&mut handle, &mut src, &mut dst, Format::Gzip)
            })
        });
        handle.destroy();
    }
    group.finish();
}

criterion_group!(benches, bench_crc32_by_origin, bench_compress_levels);
criterion_main!(benches);
