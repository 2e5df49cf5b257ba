use crate::communication::traits::{Publisher, Subscriber};
use crate::core::node::{LogSummary, NodeInfo};
use crate::error::TurtleResult;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Default number of messages a topic buffers before dropping the oldest
pub const DEFAULT_CAPACITY: usize = 1024;

/// Lock-free atomic metrics for Hub monitoring
#[derive(Debug, Default)]
pub struct AtomicHubMetrics {
    pub messages_sent: AtomicU64,
    pub messages_received: AtomicU64,
    pub messages_dropped: AtomicU64,
}

impl AtomicHubMetrics {
    /// Get current metrics snapshot
    pub fn snapshot(&self) -> HubMetrics {
        HubMetrics {
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            messages_dropped: self.messages_dropped.load(Ordering::Relaxed),
        }
    }
}

/// Plain metrics snapshot for a Hub
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HubMetrics {
    pub messages_sent: u64,
    pub messages_received: u64,
    pub messages_dropped: u64,
}

struct Topic<T> {
    name: String,
    capacity: usize,
    queue: Mutex<VecDeque<T>>,
    metrics: AtomicHubMetrics,
}

/// In-process pub/sub topic.
///
/// `Hub::new` creates a fresh topic; clones of the returned handle share it,
/// so the publisher side and the subscriber side are simply two clones.
/// The queue is bounded: when full, the oldest message is dropped, which
/// matches the keep-last behaviour of a depth-limited velocity topic.
pub struct Hub<T> {
    topic: Arc<Topic<T>>,
}

impl<T> Clone for Hub<T> {
    fn clone(&self) -> Self {
        Self {
            topic: self.topic.clone(),
        }
    }
}

impl<T> std::fmt::Debug for Hub<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hub")
            .field("topic_name", &self.topic.name)
            .field("capacity", &self.topic.capacity)
            .finish_non_exhaustive()
    }
}

impl<T: Send + 'static> Hub<T> {
    /// Create a new Hub
    pub fn new(topic_name: &str) -> TurtleResult<Self> {
        Self::new_with_capacity(topic_name, DEFAULT_CAPACITY)
    }

    /// Create a new Hub with custom capacity
    pub fn new_with_capacity(topic_name: &str, capacity: usize) -> TurtleResult<Self> {
        if capacity == 0 {
            return Err(crate::error::TurtleError::InvalidParameter(format!(
                "topic '{}' needs a capacity of at least 1",
                topic_name
            )));
        }

        Ok(Hub {
            topic: Arc::new(Topic {
                name: topic_name.to_string(),
                capacity,
                queue: Mutex::new(VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY))),
                metrics: AtomicHubMetrics::default(),
            }),
        })
    }

    /// Publish a message, recording it on `ctx` when one is given
    pub fn send(&self, msg: T, ctx: Option<&mut NodeInfo>) -> TurtleResult<()>
    where
        T: LogSummary,
    {
        if let Some(ctx) = ctx {
            ctx.log_pub(&self.topic.name, &msg);
        }
        self.push(msg);
        Ok(())
    }

    /// Receive the oldest pending message
    pub fn recv(&self, ctx: Option<&mut NodeInfo>) -> Option<T>
    where
        T: LogSummary,
    {
        let msg = self.pop()?;
        if let Some(ctx) = ctx {
            ctx.log_sub(&self.topic.name, &msg);
        }
        Some(msg)
    }

    /// Drain every pending message, oldest first
    pub fn drain(&self) -> Vec<T> {
        let drained: Vec<T> = self.topic.queue.lock().drain(..).collect();
        self.topic
            .metrics
            .messages_received
            .fetch_add(drained.len() as u64, Ordering::Relaxed);
        drained
    }

    /// Number of messages waiting to be received
    pub fn pending(&self) -> usize {
        self.topic.queue.lock().len()
    }

    /// Get current metrics snapshot
    pub fn get_metrics(&self) -> HubMetrics {
        self.topic.metrics.snapshot()
    }

    /// Get the topic name for this Hub
    pub fn get_topic_name(&self) -> &str {
        &self.topic.name
    }

    fn push(&self, msg: T) {
        let mut queue = self.topic.queue.lock();
        if queue.len() >= self.topic.capacity {
            queue.pop_front();
            self.topic
                .metrics
                .messages_dropped
                .fetch_add(1, Ordering::Relaxed);
        }
        queue.push_back(msg);
        self.topic
            .metrics
            .messages_sent
            .fetch_add(1, Ordering::Relaxed);
    }

    fn pop(&self) -> Option<T> {
        let msg = self.topic.queue.lock().pop_front()?;
        self.topic
            .metrics
            .messages_received
            .fetch_add(1, Ordering::Relaxed);
        Some(msg)
    }
}

impl<T: Send + 'static> Publisher<T> for Hub<T> {
    fn topic(&self) -> &str {
        &self.topic.name
    }

    fn send(&self, msg: T) -> TurtleResult<()> {
        self.push(msg);
        Ok(())
    }
}

impl<T: Send + 'static> Subscriber<T> for Hub<T> {
    fn recv(&self) -> Option<T> {
        self.pop()
    }

    fn has_messages(&self) -> bool {
        self.pending() > 0
    }
}
