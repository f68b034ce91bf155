//! # Device-Link Benchmarks
//!
//! Benchmark bodies, registered from `benches/transport_benchmarks.rs`.

pub mod chunked_writer;
