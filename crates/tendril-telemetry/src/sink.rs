//! Buffered telemetry sink (§4.6): per-stream buffering, flush on
//! timer/threshold, per-stream cap with drop-oldest overflow, and
//! replay-on-failure. Reuses the buffer-then-flush structure of the
//! teacher's `hip3-persistence::writer::JsonLinesWriter` (a `Vec` buffer, a
//! `max_buffer_size` threshold, explicit `flush()`), swapping the file
//! transport for HTTP.

use crate::metrics;
use crate::transport::ColdLogTransport;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, warn};

/// Per-stream cap; overflow drops the oldest record (sliding window).
pub const STREAM_CAP: usize = 10_000;
/// Threshold flush trigger: a stream buffer reaching this size flushes
/// immediately rather than waiting for the timer.
pub const FLUSH_THRESHOLD: usize = 100;
/// Timer flush interval.
pub const FLUSH_INTERVAL: Duration = Duration::from_secs(5);

struct StreamBuffer {
    records: Mutex<VecDeque<Value>>,
    /// Ensures at most one flush is in flight per stream; concurrent
    /// triggers (timer firing mid-threshold-flush) serialize by skipping.
    flushing: AtomicBool,
}

impl StreamBuffer {
    fn new() -> Self {
        Self {
            records: Mutex::new(VecDeque::new()),
            flushing: AtomicBool::new(false),
        }
    }

    fn push(&self, record: Value) -> usize {
        let mut guard = self.records.lock();
        if guard.len() >= STREAM_CAP {
            guard.pop_front();
        }
        guard.push_back(record);
        guard.len()
    }

    fn drain_all(&self) -> Vec<Value> {
        let mut guard = self.records.lock();
        guard.drain(..).collect()
    }

    /// Re-insert a failed batch at the front, in original order, subject to
    /// the per-stream cap.
    fn requeue_front(&self, batch: Vec<Value>) -> usize {
        let mut guard = self.records.lock();
        let mut requeued = 0;
        for record in batch.into_iter().rev() {
            if guard.len() >= STREAM_CAP {
                break;
            }
            guard.push_front(record);
            requeued += 1;
        }
        requeued
    }

    fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

/// Non-blocking, buffered sink over an arbitrary `ColdLogTransport`.
pub struct TelemetrySink {
    streams: Mutex<HashMap<String, Arc<StreamBuffer>>>,
    transport: Arc<dyn ColdLogTransport>,
    timer_handle: Mutex<Option<JoinHandle<()>>>,
}

impl TelemetrySink {
    pub fn new(transport: Arc<dyn ColdLogTransport>) -> Arc<Self> {
        Arc::new(Self {
            streams: Mutex::new(HashMap::new()),
            transport,
            timer_handle: Mutex::new(None),
        })
    }

    fn stream_buffer(&self, stream: &str) -> Arc<StreamBuffer> {
        let mut streams = self.streams.lock();
        streams
            .entry(stream.to_string())
            .or_insert_with(|| Arc::new(StreamBuffer::new()))
            .clone()
    }

    /// Buffers `records` for `stream`. Non-blocking: triggers an
    /// asynchronous flush when the stream crosses `FLUSH_THRESHOLD` rather
    /// than awaiting one.
    pub fn ingest(self: &Arc<Self>, stream: &str, records: Vec<Value>) {
        if records.is_empty() {
            return;
        }
        let buffer = self.stream_buffer(stream);
        let mut crossed_threshold = false;
        for record in records {
            let len = buffer.push(record);
            if len >= FLUSH_THRESHOLD {
                crossed_threshold = true;
            }
        }
        if crossed_threshold {
            let sink = self.clone();
            let stream = stream.to_string();
            tokio::spawn(async move {
                sink.flush_stream(&stream).await;
            });
        }
    }

    /// Start the 5-second flush timer. Returns immediately; the timer runs
    /// as a background task until `shutdown()` stops it.
    pub fn start(self: &Arc<Self>) {
        let sink = self.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = interval(FLUSH_INTERVAL);
            loop {
                ticker.tick().await;
                sink.flush_all().await;
            }
        });
        *self.timer_handle.lock() = Some(handle);
    }

    async fn flush_all(self: &Arc<Self>) {
        let names: Vec<String> = {
            let streams = self.streams.lock();
            streams
                .iter()
                .filter(|(_, buf)| !buf.is_empty())
                .map(|(name, _)| name.clone())
                .collect()
        };
        for name in names {
            self.flush_stream(&name).await;
        }
    }

    async fn flush_stream(self: &Arc<Self>, stream: &str) {
        let buffer = self.stream_buffer(stream);
        if buffer
            .flushing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            // A flush for this stream is already in flight; the timer or
            // next threshold crossing will pick up what remains.
            return;
        }

        let batch = buffer.drain_all();
        if !batch.is_empty() {
            if let Err(e) = self.transport.send(stream, &batch).await {
                warn!(stream, error = %e, records = batch.len(), "telemetry flush failed, requeuing");
                metrics::TELEMETRY_FLUSH_FAILURES_TOTAL
                    .with_label_values(&[stream])
                    .inc();
                let requeued = buffer.requeue_front(batch);
                metrics::TELEMETRY_REPLAYS_TOTAL
                    .with_label_values(&[stream])
                    .inc_by(requeued as f64);
            } else {
                debug!(stream, records = batch.len(), "telemetry flush succeeded");
            }
        }

        buffer.flushing.store(false, Ordering::Release);
    }

    /// Stops the timer and drains every stream exactly once.
    pub async fn shutdown(self: &Arc<Self>) {
        if let Some(handle) = self.timer_handle.lock().take() {
            handle.abort();
        }
        self.flush_all().await;
    }
}
