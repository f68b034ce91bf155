//! # Integration Test Flows
//!
//! Host and loopback device talking over two in-memory packet channels:
//!
//! 1. **Request → reply**: broker writes a framed request, device answers,
//!    listener wakes the waiting caller
//! 2. **Concurrency**: many callers share one broker; every reply reaches its
//!    own caller
//! 3. **Abort paths**: silent device, cancelled caller, duplicate replies
//! 4. **Bulk upload**: a counted firmware image through the same path

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use dl_02_packet_transport::adapters::MemorySink;
    use dl_02_packet_transport::{
        ChunkedWriter, CountingReader, CountingSink, Progress, ProgressCounter,
    };
    use dl_03_broker::{BrokerConfig, BrokerError};
    use dl_telemetry::{init_logging, TelemetryConfig};
    use tokio::io::AsyncReadExt;
    use tokio_util::sync::CancellationToken;

    use crate::integration::loopback::{echo, LoopbackHost, Reply, Responder};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn setup_logging() {
        // Several tests race to install it; losing is fine.
        let _ = init_logging(&TelemetryConfig::for_tests());
    }

    fn config_with_timeout(ms: u64) -> BrokerConfig {
        BrokerConfig {
            request_timeout_ms: ms,
            ..Default::default()
        }
    }

    /// Silent for bodies starting with `quiet`, echo otherwise.
    fn selective() -> Responder {
        Arc::new(|body: &[u8]| {
            if body.starts_with(b"quiet") {
                Reply::Silent
            } else {
                Reply::Body(body.to_vec())
            }
        })
    }

    // =============================================================================
    // REQUEST → REPLY
    // =============================================================================

    #[tokio::test]
    async fn test_round_trip_across_many_packets() {
        setup_logging();
        let responder: Responder = Arc::new(|body: &[u8]| Reply::Body(body.to_ascii_uppercase()));
        let host = LoopbackHost::start(64, BrokerConfig::default(), responder).unwrap();

        let body = b"read_register ".repeat(20);
        let reply = host
            .broker
            .request(&body, "read_register".into(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(&reply[..], &body.to_ascii_uppercase()[..]);
        assert!(host.broker.in_flight().is_empty());

        let (device, listener) = host.shutdown().await.unwrap();
        assert_eq!(device.requests, 1);
        assert_eq!(device.replies, 1);
        assert_eq!(listener.delivered, 1);
        assert_eq!(listener.dropped, 0);
    }

    /// 16-byte id + 8-byte length + 40-byte body fills exactly one 64-byte
    /// packet; only the terminator tells the device the frame is complete.
    #[tokio::test]
    async fn test_frame_on_packet_boundary() {
        let host = LoopbackHost::start(64, BrokerConfig::default(), echo()).unwrap();

        let body = [0x5Au8; 40];
        let reply = host
            .broker
            .request(&body, "boundary".into(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(&reply[..], &body[..]);
        host.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_body() {
        let host = LoopbackHost::start(64, BrokerConfig::default(), echo()).unwrap();

        let reply = host
            .broker
            .request(b"", "noop".into(), &CancellationToken::new())
            .await
            .unwrap();

        assert!(reply.is_empty());
        host.shutdown().await.unwrap();
    }

    // =============================================================================
    // CONCURRENCY
    // =============================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_get_their_own_replies() {
        setup_logging();
        let responder: Responder = Arc::new(|body: &[u8]| {
            let mut reply = b"ack:".to_vec();
            reply.extend_from_slice(body);
            Reply::Body(reply)
        });
        let host = LoopbackHost::start(16, BrokerConfig::default(), responder).unwrap();

        let mut handles = Vec::new();
        for i in 0..32 {
            let broker = Arc::clone(&host.broker);
            handles.push(tokio::spawn(async move {
                let body = format!("request-{i}-{}", "x".repeat(i * 3));
                let reply = broker
                    .request(body.as_bytes(), format!("req-{i}"), &CancellationToken::new())
                    .await
                    .unwrap();
                assert_eq!(reply, format!("ack:{body}").into_bytes());
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(host.broker.pending_count(), 0);
        assert!(host.broker.in_flight().is_empty());

        let (device, listener) = host.shutdown().await.unwrap();
        assert_eq!(device.requests, 32);
        assert_eq!(listener.delivered, 32);
    }

    // =============================================================================
    // ABORT PATHS
    // =============================================================================

    #[tokio::test]
    async fn test_silent_device_times_out_then_recovers() {
        let host = LoopbackHost::start(64, config_with_timeout(50), selective()).unwrap();
        let cancel = CancellationToken::new();

        let err = host
            .broker
            .request(b"quiet please", "quiet".into(), &cancel)
            .await
            .unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(host.broker.pending_count(), 0);
        assert!(host.broker.in_flight().is_empty());

        // The session is still usable.
        let reply = host
            .broker
            .request(b"hello", "hello".into(), &cancel)
            .await
            .unwrap();
        assert_eq!(&reply[..], b"hello");

        host.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_cancel_while_waiting() {
        let host = LoopbackHost::start(64, config_with_timeout(10_000), selective()).unwrap();
        let cancel = CancellationToken::new();

        let broker = Arc::clone(&host.broker);
        let token = cancel.clone();
        let pending = tokio::spawn(async move {
            broker
                .request(b"quiet, then cancelled", "cancel-me".into(), &token)
                .await
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(host.broker.in_flight().len(), 1);
        cancel.cancel();

        let err = pending.await.unwrap().unwrap_err();
        assert!(matches!(err, BrokerError::Cancelled { .. }));
        assert!(host.broker.in_flight().is_empty());
        assert_eq!(host.broker.waiters().stats().cancelled, 1);

        host.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_reply_is_dropped() {
        let responder: Responder = Arc::new(|body: &[u8]| Reply::Twice(body.to_vec()));
        let host = LoopbackHost::start(64, BrokerConfig::default(), responder).unwrap();

        let reply = host
            .broker
            .request(b"once", "once".into(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(&reply[..], b"once");

        let (device, listener) = host.shutdown().await.unwrap();
        assert_eq!(device.replies, 2);
        assert_eq!(listener.delivered, 1);
        assert_eq!(listener.dropped, 1);
    }

    // =============================================================================
    // BULK UPLOAD
    // =============================================================================

    #[tokio::test]
    async fn test_firmware_upload_progress() {
        let image: Vec<u8> = (0..4096u32).map(|i| (i % 251) as u8).collect();

        let mut reader = CountingReader::new(&image[..]);
        let read_counter = reader.counter();
        let mut staged = Vec::new();
        reader.read_to_end(&mut staged).await.unwrap();
        assert_eq!(
            Progress::sample(&read_counter, Some(image.len() as u64)).to_string(),
            "4.0 KiB / 4.0 KiB (100.0%)"
        );

        let sink = MemorySink::new(512);
        let counting = CountingSink::new(sink.clone());
        let sent = counting.counter();
        let mut writer = ChunkedWriter::new(counting).unwrap();

        let written = writer.write(&staged, &CancellationToken::new()).await.unwrap();

        assert_eq!(written, image.len());
        assert_eq!(sent.count(), image.len() as u64);
        assert_eq!(sink.packet_count(), 9);
        assert_eq!(sink.concatenated(), image);
    }
}
