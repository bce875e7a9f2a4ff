//! Raw-line hand-off queue between transport and consumer.
//!
//! This is the only resource shared across threads: the transport task
//! pushes framed lines in, exactly one consumer drains them out. The queue
//! is unbounded FIFO; the only backpressure mechanism is purge-on-new-frame
//! (see [`crate::ClientConfig::purge_on_frame`]), which trades history for
//! freshness under a slow consumer. Without it, a stalled consumer means
//! unbounded growth.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use futures::Stream;
use tokio::sync::Notify;

#[derive(Default)]
struct QueueState {
    lines: VecDeque<String>,
    closed: bool,
}

/// Unbounded, thread-safe FIFO of raw telemetry lines.
///
/// Cheaply clonable handle; all clones share the same queue. Insertion
/// order is preserved. Closing is terminal and wakes any waiting consumer.
#[derive(Clone, Default)]
pub struct LineQueue {
    state: Arc<Mutex<QueueState>>,
    notify: Arc<Notify>,
}

impl LineQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one line.
    pub fn push(&self, line: String) {
        let mut state = self.state.lock().expect("queue lock poisoned");
        state.lines.push_back(line);
        drop(state);
        self.notify.notify_one();
    }

    /// Discards all queued lines, keeping the queue usable.
    pub fn purge(&self) {
        self.state.lock().expect("queue lock poisoned").lines.clear();
    }

    /// Marks the queue closed and wakes the consumer. Already-queued lines
    /// stay drainable.
    pub fn close(&self) {
        self.state.lock().expect("queue lock poisoned").closed = true;
        self.notify.notify_waiters();
        self.notify.notify_one();
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().expect("queue lock poisoned").closed
    }

    pub fn len(&self) -> usize {
        self.state.lock().expect("queue lock poisoned").lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Takes everything currently queued, in insertion order.
    pub fn drain(&self) -> Vec<String> {
        let mut state = self.state.lock().expect("queue lock poisoned");
        state.lines.drain(..).collect()
    }

    /// Consumes this handle into a `Stream` of line batches.
    ///
    /// Ends when the queue closes. Same single-consumer discipline as
    /// [`LineQueue::recv_batch`].
    pub fn into_batch_stream(self) -> impl Stream<Item = Vec<String>> {
        futures::stream::unfold(self, |queue| async move {
            queue.recv_batch().await.map(|batch| (batch, queue))
        })
    }

    /// Waits until at least one line is queued, then drains the batch.
    ///
    /// Returns `None` once the queue is closed and fully drained. Intended
    /// for a single consumer at a time; batches preserve FIFO order.
    pub async fn recv_batch(&self) -> Option<Vec<String>> {
        loop {
            let notified = self.notify.notified();
            {
                let mut state = self.state.lock().expect("queue lock poisoned");
                if !state.lines.is_empty() {
                    return Some(state.lines.drain(..).collect());
                }
                if state.closed {
                    return None;
                }
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_order_preserved() {
        let queue = LineQueue::new();
        queue.push("a".into());
        queue.push("b".into());
        queue.push("c".into());
        assert_eq!(queue.drain(), vec!["a", "b", "c"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn purge_discards_pending_lines() {
        let queue = LineQueue::new();
        queue.push("stale".into());
        queue.purge();
        queue.push("fresh".into());
        assert_eq!(queue.drain(), vec!["fresh"]);
    }

    #[tokio::test]
    async fn recv_batch_returns_queued_lines() {
        let queue = LineQueue::new();
        queue.push("one".into());
        queue.push("two".into());
        assert_eq!(queue.recv_batch().await.unwrap(), vec!["one", "two"]);
    }

    #[tokio::test]
    async fn recv_batch_wakes_on_push() {
        let queue = LineQueue::new();
        let waiter = queue.clone();
        let handle = tokio::spawn(async move { waiter.recv_batch().await });
        tokio::task::yield_now().await;
        queue.push("late".into());
        assert_eq!(handle.await.unwrap().unwrap(), vec!["late"]);
    }

    #[tokio::test]
    async fn close_drains_then_ends() {
        let queue = LineQueue::new();
        queue.push("last".into());
        queue.close();
        assert_eq!(queue.recv_batch().await.unwrap(), vec!["last"]);
        assert_eq!(queue.recv_batch().await, None);
    }

    #[tokio::test]
    async fn batch_stream_ends_on_close() {
        use futures::StreamExt;

        let queue = LineQueue::new();
        queue.push("a".into());
        queue.push("b".into());
        queue.close();

        let batches: Vec<Vec<String>> = queue.into_batch_stream().collect().await;
        assert_eq!(batches, vec![vec!["a".to_string(), "b".to_string()]]);
    }

    #[tokio::test]
    async fn close_wakes_idle_consumer() {
        let queue = LineQueue::new();
        let waiter = queue.clone();
        let handle = tokio::spawn(async move { waiter.recv_batch().await });
        tokio::task::yield_now().await;
        queue.close();
        assert_eq!(handle.await.unwrap(), None);
    }
}
