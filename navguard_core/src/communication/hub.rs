use crate::core::node::{LogSummary, NodeInfo};
use crate::error::{NavGuardError, NavGuardResult};
use crossbeam::queue::ArrayQueue;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Default queue depth for a topic
pub const DEFAULT_HUB_CAPACITY: usize = 1024;

type TopicEntry = Arc<dyn Any + Send + Sync>;

/// Process-wide topic registry: every `Hub` created with the same name
/// shares one bounded queue.
static TOPICS: Lazy<Mutex<HashMap<String, TopicEntry>>> = Lazy::new(|| Mutex::new(HashMap::new()));

struct Topic<T> {
    queue: ArrayQueue<T>,
    metrics: AtomicHubMetrics,
}

/// Lock-free metrics shared by all handles on one topic
#[derive(Debug, Default)]
pub struct AtomicHubMetrics {
    pub messages_sent: AtomicU64,
    pub messages_received: AtomicU64,
    pub messages_dropped: AtomicU64,
}

impl AtomicHubMetrics {
    pub fn snapshot(&self) -> HubMetrics {
        HubMetrics {
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            messages_dropped: self.messages_dropped.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HubMetrics {
    pub messages_sent: u64,
    pub messages_received: u64,
    /// Oldest messages overwritten because the queue was full
    pub messages_dropped: u64,
}

/// Named in-process topic handle for publish/subscribe messaging
///
/// The queue is bounded. When it is full a send overwrites the oldest
/// message, so a topic created with capacity 1 always holds only the latest
/// message. The first handle created for a name decides the capacity.
pub struct Hub<T> {
    topic: Arc<Topic<T>>,
    topic_name: String,
}

impl<T> Clone for Hub<T> {
    fn clone(&self) -> Self {
        Self {
            topic: self.topic.clone(),
            topic_name: self.topic_name.clone(),
        }
    }
}

impl<T> std::fmt::Debug for Hub<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hub")
            .field("topic_name", &self.topic_name)
            .field("pending", &self.topic.queue.len())
            .finish_non_exhaustive()
    }
}

impl<T: Send + 'static> Hub<T> {
    pub fn new(topic_name: &str) -> NavGuardResult<Self> {
        Self::new_with_capacity(topic_name, DEFAULT_HUB_CAPACITY)
    }

    pub fn new_with_capacity(topic_name: &str, capacity: usize) -> NavGuardResult<Self> {
        if topic_name.is_empty() {
            return Err(NavGuardError::Communication(
                "Topic name must not be empty".to_string(),
            ));
        }
        if capacity == 0 {
            return Err(NavGuardError::Communication(format!(
                "Topic '{}' needs a capacity of at least 1",
                topic_name
            )));
        }

        let mut topics = TOPICS.lock();
        let entry = topics
            .entry(topic_name.to_string())
            .or_insert_with(|| {
                Arc::new(Topic::<T> {
                    queue: ArrayQueue::new(capacity),
                    metrics: AtomicHubMetrics::default(),
                }) as TopicEntry
            })
            .clone();
        drop(topics);

        let topic = entry.downcast::<Topic<T>>().map_err(|_| {
            NavGuardError::Communication(format!(
                "Topic '{}' is already registered with a different message type",
                topic_name
            ))
        })?;

        Ok(Hub {
            topic,
            topic_name: topic_name.to_string(),
        })
    }

    /// Publish a message, overwriting the oldest one if the queue is full
    pub fn send(&self, msg: T, ctx: Option<&mut NodeInfo>)
    where
        T: LogSummary,
    {
        if let Some(ctx) = ctx {
            let summary = msg.log_summary();
            ctx.log_pub_summary(&self.topic_name, &summary);
        }

        let metrics = &self.topic.metrics;
        if self.topic.queue.force_push(msg).is_some() {
            metrics.messages_dropped.fetch_add(1, Ordering::Relaxed);
        }
        metrics.messages_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Take the oldest pending message, if any
    pub fn recv(&self, ctx: Option<&mut NodeInfo>) -> Option<T>
    where
        T: LogSummary,
    {
        let msg = self.topic.queue.pop()?;
        if let Some(ctx) = ctx {
            ctx.log_sub_summary(&self.topic_name, &msg.log_summary());
        }
        self.topic
            .metrics
            .messages_received
            .fetch_add(1, Ordering::Relaxed);
        Some(msg)
    }

    /// Drain every pending message and keep only the newest.
    /// Returns the newest message and the number of older ones discarded.
    pub fn recv_latest(&self, mut ctx: Option<&mut NodeInfo>) -> Option<(T, usize)>
    where
        T: LogSummary,
    {
        let mut latest = self.recv(ctx.as_deref_mut())?;
        let mut skipped = 0;
        while let Some(next) = self.recv(ctx.as_deref_mut()) {
            latest = next;
            skipped += 1;
        }
        Some((latest, skipped))
    }

    pub fn pending(&self) -> usize {
        self.topic.queue.len()
    }

    pub fn capacity(&self) -> usize {
        self.topic.queue.capacity()
    }

    pub fn get_metrics(&self) -> HubMetrics {
        self.topic.metrics.snapshot()
    }

    pub fn get_topic_name(&self) -> &str {
        &self.topic_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::RuntimeParams;

    #[test]
    fn test_send_recv_fifo() {
        let publisher: Hub<String> = Hub::new("hub_test/fifo").unwrap();
        let subscriber: Hub<String> = Hub::new("hub_test/fifo").unwrap();

        publisher.send("a".to_string(), None);
        publisher.send("b".to_string(), None);

        assert_eq!(subscriber.recv(None).as_deref(), Some("a"));
        assert_eq!(subscriber.recv(None).as_deref(), Some("b"));
        assert_eq!(subscriber.recv(None), None);
    }

    #[test]
    fn test_full_queue_drops_oldest() {
        let hub: Hub<f64> = Hub::new_with_capacity("hub_test/latest_only", 1).unwrap();
        hub.send(1.0, None);
        hub.send(2.0, None);
        hub.send(3.0, None);

        assert_eq!(hub.recv(None), Some(3.0));
        assert_eq!(hub.recv(None), None);

        let metrics = hub.get_metrics();
        assert_eq!(metrics.messages_sent, 3);
        assert_eq!(metrics.messages_dropped, 2);
        assert_eq!(metrics.messages_received, 1);
    }

    #[test]
    fn test_first_handle_sets_capacity() {
        let first: Hub<bool> = Hub::new_with_capacity("hub_test/capacity", 2).unwrap();
        let second: Hub<bool> = Hub::new_with_capacity("hub_test/capacity", 64).unwrap();
        assert_eq!(first.capacity(), 2);
        assert_eq!(second.capacity(), 2);
    }

    #[test]
    fn test_recv_latest_counts_skipped() {
        let hub: Hub<f64> = Hub::new("hub_test/recv_latest").unwrap();
        for i in 0..5 {
            hub.send(i as f64, None);
        }
        assert_eq!(hub.recv_latest(None), Some((4.0, 4)));
        assert_eq!(hub.recv_latest(None), None);
    }

    #[test]
    fn test_type_mismatch_is_rejected() {
        let _strings: Hub<String> = Hub::new("hub_test/mismatch").unwrap();
        let floats = Hub::<f64>::new("hub_test/mismatch");
        assert!(matches!(floats, Err(NavGuardError::Communication(_))));
    }

    #[test]
    fn test_invalid_arguments() {
        assert!(Hub::<f64>::new("").is_err());
        assert!(Hub::<f64>::new_with_capacity("hub_test/zero", 0).is_err());
    }

    #[test]
    fn test_context_logging_counts_topics() {
        let hub: Hub<f64> = Hub::new("hub_test/ctx").unwrap();
        let mut ctx =
            NodeInfo::with_params("hub_test".to_string(), false, RuntimeParams::with_defaults());

        hub.send(0.5, Some(&mut ctx));
        let _ = hub.recv(Some(&mut ctx));

        assert_eq!(ctx.published_topics()["hub_test/ctx"], 1);
        assert_eq!(ctx.subscribed_topics()["hub_test/ctx"], 1);
    }
}
