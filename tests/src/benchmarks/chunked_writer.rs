//! # Chunked Writer Benchmarks
//!
//! Framing cost per message across payload sizes and both USB bulk packet
//! sizes. The sink is in-memory, so this measures segmentation and
//! bookkeeping rather than any transport.

use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use dl_02_packet_transport::adapters::MemorySink;
use dl_02_packet_transport::{
    ChunkedWriter, Reassembler, FULL_SPEED_BULK_PACKET, HIGH_SPEED_BULK_PACKET,
};
use tokio_util::sync::CancellationToken;

const PAYLOAD_SIZES: [usize; 4] = [0, 130, 4 * 1024, 64 * 1024];

pub fn bench_chunked_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("dl-02-chunked-write");
    let runtime = match tokio::runtime::Builder::new_current_thread().build() {
        Ok(runtime) => runtime,
        Err(e) => panic!("failed to build benchmark runtime: {e}"),
    };
    let cancel = CancellationToken::new();

    for max_packet in [FULL_SPEED_BULK_PACKET, HIGH_SPEED_BULK_PACKET] {
        for size in PAYLOAD_SIZES {
            let payload = vec![0xA5u8; size];
            let sink = MemorySink::new(max_packet);
            let Ok(mut writer) = ChunkedWriter::new(sink.clone()) else {
                continue;
            };

            group.throughput(Throughput::Bytes(size as u64));
            group.bench_with_input(
                BenchmarkId::new(format!("packet_{max_packet}"), size),
                &payload,
                |b, payload| {
                    b.iter(|| {
                        sink.clear();
                        let written = runtime.block_on(writer.write(payload, &cancel));
                        black_box(written.is_ok())
                    })
                },
            );
        }
    }

    group.finish();
}

pub fn bench_reassembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("dl-02-reassembly");

    for size in PAYLOAD_SIZES {
        let payload = vec![0x3Cu8; size];
        let packets: Vec<&[u8]> = payload
            .chunks(HIGH_SPEED_BULK_PACKET)
            .chain(std::iter::once(&[][..]))
            .collect();

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &packets, |b, packets| {
            let mut reassembler = Reassembler::new(usize::MAX);
            b.iter(|| {
                let mut message = None;
                for packet in packets {
                    if let Ok(Some(done)) = reassembler.feed(packet) {
                        message = Some(done);
                    }
                }
                black_box(message)
            })
        });
    }

    group.finish();
}
