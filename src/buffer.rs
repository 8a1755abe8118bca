//! `ProducerBuffer`: a bounded, non-blocking-push FIFO of vetted [`Producer`]s
//! shared between the vetting pipeline (writer) and the HTTP server
//! (reader). Built on a bounded [`tokio::sync::mpsc`] channel, which already
//! gives us the exact contract the spec asks for: `try_send` never blocks
//! and drops on a full channel, while the receiver can be polled with a
//! per-call timeout.

use crate::model::Producer;
use std::time::Duration;
use tokio::sync::mpsc;

pub struct ProducerBuffer {
    tx: mpsc::Sender<Producer>,
    rx: tokio::sync::Mutex<mpsc::Receiver<Producer>>,
}

impl ProducerBuffer {
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        Self { tx, rx: tokio::sync::Mutex::new(rx) }
    }

    /// Enqueues `producer` if a slot is free; silently drops it otherwise.
    pub fn try_push(&self, producer: Producer) {
        if let Err(mpsc::error::TrySendError::Full(dropped)) = self.tx.try_send(producer) {
            tracing::debug!(addr = %dropped.addr, port = dropped.port, "producer buffer full, dropping");
        }
    }

    /// Pops up to `n` producers. The first pop waits up to `read_timeout`;
    /// subsequent pops return immediately if nothing is ready.
    pub async fn drain_up_to(&self, n: usize, read_timeout: Duration) -> Vec<Producer> {
        let mut rx = self.rx.lock().await;
        let mut out = Vec::with_capacity(n);

        if n == 0 {
            return out;
        }

        match tokio::time::timeout(read_timeout, rx.recv()).await {
            Ok(Some(first)) => out.push(first),
            Ok(None) | Err(_) => return out,
        }

        while out.len() < n {
            match rx.try_recv() {
                Ok(p) => out.push(p),
                Err(_) => break,
            }
        }

        out
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn producer(addr: &str) -> Producer {
        Producer { addr: addr.to_string(), port: 3001, valency: 1 }
    }

    #[tokio::test]
    async fn drains_in_fifo_order() {
        let buf = ProducerBuffer::new(10);
        buf.try_push(producer("1.2.3.4"));
        buf.try_push(producer("5.6.7.8"));

        let drained = buf.drain_up_to(5, Duration::from_millis(50)).await;
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].addr, "1.2.3.4");
        assert_eq!(drained[1].addr, "5.6.7.8");
    }

    #[tokio::test]
    async fn drain_on_empty_buffer_waits_then_returns_empty() {
        let buf = ProducerBuffer::new(10);
        let start = std::time::Instant::now();
        let drained = buf.drain_up_to(5, Duration::from_millis(50)).await;
        assert!(drained.is_empty());
        assert!(start.elapsed() >= Duration::from_millis(40));
    }

    #[tokio::test]
    async fn try_push_on_full_buffer_drops_without_blocking() {
        let buf = ProducerBuffer::new(1);
        buf.try_push(producer("1.1.1.1"));
        buf.try_push(producer("2.2.2.2")); // dropped, buffer full

        let drained = buf.drain_up_to(5, Duration::from_millis(50)).await;
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].addr, "1.1.1.1");
    }

    #[tokio::test]
    async fn drain_caps_at_n() {
        let buf = ProducerBuffer::new(10);
        for i in 0..5 {
            buf.try_push(producer(&format!("10.0.0.{i}")));
        }
        let drained = buf.drain_up_to(3, Duration::from_millis(50)).await;
        assert_eq!(drained.len(), 3);
    }
}
