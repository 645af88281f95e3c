//! Criterion benchmark for the block compressor core.
//!
//! Run with:
//!   cargo bench --bench compress

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use zx0::config::{BLOCK_FLAG_FIRST, BLOCK_FLAG_LAST};
use zx0::{Compressor, Config};

fn synthetic_chunk(size: usize) -> Vec<u8> {
    let mut state: u64 = 0x2545_F491_4F6C_DD1D;
    let mut out = Vec::with_capacity(size);
    while out.len() < size {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        // Bias toward repetition: only one byte in four is "fresh",
        // the rest copy a byte from a few positions back.
        if out.len() >= 4 && state % 4 != 0 {
            let back = 1 + (state % 4) as usize;
            let idx = out.len() - back;
            out.push(out[idx]);
        } else {
            out.push((state >> 56) as u8);
        }
    }
    out
}

fn bench_compress_block(c: &mut Criterion) {
    let mut group = c.benchmark_group("compress_block");

    for &chunk_size in &[65_536usize, 262_144] {
        let chunk = synthetic_chunk(chunk_size);
        group.throughput(Throughput::Bytes(chunk_size as u64));
        group.bench_with_input(
            BenchmarkId::new("compress_block", chunk_size),
            &chunk,
            |b, chunk| {
                let mut compressor = Compressor::new(Config::default()).unwrap();
                b.iter(|| {
                    let mut out = Vec::new();
                    let mut rep_offset = 1u32;
                    compressor
                        .compress_block(
                            chunk,
                            0,
                            chunk.len(),
                            &mut out,
                            &mut rep_offset,
                            BLOCK_FLAG_FIRST | BLOCK_FLAG_LAST,
                        )
                        .unwrap();
                    out
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_compress_block);
criterion_main!(benches);
