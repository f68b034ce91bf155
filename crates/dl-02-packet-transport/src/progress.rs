//! Byte counters for progress reporting.
//!
//! Counters only ever grow. A UI polls [`ProgressCounter::count`] on its own
//! schedule; nothing here pushes updates.

use async_trait::async_trait;
use pin_project_lite::pin_project;
use std::fmt;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, ReadBuf};

use crate::error::SinkError;
use crate::ports::PacketSink;

/// Anything exposing a monotonically increasing count of processed bytes.
pub trait ProgressCounter: Send + Sync {
    fn count(&self) -> u64;
}

/// Shared atomic byte count. Clones observe the same value.
#[derive(Debug, Clone, Default)]
pub struct ByteCounter {
    bytes: Arc<AtomicU64>,
}

impl ByteCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, n: u64) {
        self.bytes.fetch_add(n, Ordering::Relaxed);
    }
}

impl ProgressCounter for ByteCounter {
    fn count(&self) -> u64 {
        self.bytes.load(Ordering::Relaxed)
    }
}

/// Packet sink wrapper counting the bytes the inner sink accepts.
pub struct CountingSink<S> {
    inner: S,
    counter: ByteCounter,
}

impl<S> CountingSink<S> {
    pub fn new(inner: S) -> Self {
        Self::with_counter(inner, ByteCounter::new())
    }

    pub fn with_counter(inner: S, counter: ByteCounter) -> Self {
        Self { inner, counter }
    }

    /// Handle onto the running count.
    pub fn counter(&self) -> ByteCounter {
        self.counter.clone()
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

#[async_trait]
impl<S: PacketSink> PacketSink for CountingSink<S> {
    fn max_packet_size(&self) -> usize {
        self.inner.max_packet_size()
    }

    async fn write_packet(&mut self, packet: &[u8]) -> Result<usize, SinkError> {
        match self.inner.write_packet(packet).await {
            Ok(n) => {
                self.counter.add(n as u64);
                Ok(n)
            }
            Err(e) => {
                self.counter.add(e.written() as u64);
                Err(e)
            }
        }
    }
}

pin_project! {
    /// `AsyncRead` wrapper counting bytes read, e.g. from a firmware image.
    pub struct CountingReader<R> {
        #[pin]
        inner: R,
        counter: ByteCounter,
    }
}

impl<R> CountingReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            counter: ByteCounter::new(),
        }
    }

    pub fn counter(&self) -> ByteCounter {
        self.counter.clone()
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: AsyncRead> AsyncRead for CountingReader<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        let this = self.project();
        let before = buf.filled().len();
        let poll = this.inner.poll_read(cx, buf);
        if let Poll::Ready(Ok(())) = &poll {
            this.counter.add((buf.filled().len() - before) as u64);
        }
        poll
    }
}

/// Progress at one instant against an optional known total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub done: u64,
    pub total: Option<u64>,
}

impl Progress {
    pub fn sample(counter: &dyn ProgressCounter, total: Option<u64>) -> Self {
        Self {
            done: counter.count(),
            total,
        }
    }

    /// Percentage in `0.0..=100.0`, or `None` when the total is unknown.
    pub fn percent(&self) -> Option<f64> {
        match self.total {
            Some(total) if total > 0 => {
                Some((self.done as f64 / total as f64 * 100.0).clamp(0.0, 100.0))
            }
            _ => None,
        }
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.total, self.percent()) {
            (Some(total), Some(pct)) => write!(
                f,
                "{} / {} ({:.1}%)",
                format_bytes(self.done),
                format_bytes(total),
                pct
            ),
            _ => write!(f, "{} processed", format_bytes(self.done)),
        }
    }
}

/// Render a byte count in binary units, e.g. `512 B`, `1.5 MiB`.
pub fn format_bytes(bytes: u64) -> String {
    const UNIT: u64 = 1024;
    const PREFIXES: [char; 6] = ['K', 'M', 'G', 'T', 'P', 'E'];

    if bytes < UNIT {
        return format!("{} B", bytes);
    }
    let mut div = UNIT;
    let mut exp = 0;
    let mut n = bytes / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }
    format!("{:.1} {}iB", bytes as f64 / div as f64, PREFIXES[exp])
}
