//! # Bus Publisher
//!
//! Defines the publishing side of the bus.

use crate::events::{BusMessage, EventFilter};
use crate::subscriber::{EventStream, InterestGuard, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use shared_types::Channel;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Live subscription count per channel.
pub(crate) type InterestMap = Arc<RwLock<HashMap<Channel, usize>>>;

/// Trait for publishing payloads to the bus.
#[async_trait]
pub trait BusPublisher: Send + Sync {
    /// Publish `payload` on `channel`.
    ///
    /// # Returns
    ///
    /// The number of live subscriptions selecting `channel`. Zero means the
    /// message was dropped.
    async fn publish(&self, channel: Channel, payload: Vec<u8>) -> usize;

    /// Get the total number of messages published.
    fn messages_published(&self) -> u64;
}

/// In-memory implementation of the bus.
///
/// Uses `tokio::sync::broadcast` for multi-producer, multi-consumer semantics.
/// Stands in for an external broker in a single process.
pub struct InMemoryBus {
    /// Broadcast sender for messages.
    sender: broadcast::Sender<BusMessage>,

    /// Active subscription count by channel.
    interest: InterestMap,

    /// Total messages published.
    messages_published: AtomicU64,

    /// Channel capacity.
    capacity: usize,
}

impl InMemoryBus {
    /// Create a new in-memory bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new in-memory bus with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            interest: Arc::new(RwLock::new(HashMap::new())),
            messages_published: AtomicU64::new(0),
            capacity: capacity.max(1),
        }
    }

    /// Subscribe to messages matching a filter.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        let receiver = self.sender.subscribe();
        let guard = InterestGuard::register(self.interest.clone(), filter.selected());

        debug!(channels = ?filter.channels, "New subscription created");

        Subscription::new(receiver, filter, guard)
    }

    /// Get a stream of messages matching a filter.
    #[must_use]
    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        let receiver = self.sender.subscribe();
        let guard = InterestGuard::register(self.interest.clone(), filter.selected());
        EventStream::new(receiver, filter, guard)
    }

    /// Get the number of active subscribers on any channel.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Get the number of active subscriptions selecting `channel`.
    #[must_use]
    pub fn subscribers_for(&self, channel: Channel) -> usize {
        self.interest
            .read()
            .map(|map| map.get(&channel).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Get the channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BusPublisher for InMemoryBus {
    async fn publish(&self, channel: Channel, payload: Vec<u8>) -> usize {
        // Always increment counter (publish was attempted)
        self.messages_published.fetch_add(1, Ordering::Relaxed);

        let interested = self.subscribers_for(channel);
        if interested == 0 {
            warn!(channel = %channel, "Message dropped (no subscribers)");
            return 0;
        }

        let message = BusMessage::new(channel, payload);
        let id = message.id;
        match self.sender.send(message) {
            Ok(receivers) => {
                debug!(
                    channel = %channel,
                    message_id = %id,
                    receivers,
                    interested,
                    "Message published"
                );
                interested
            }
            Err(e) => {
                warn!(channel = %channel, error = %e, "Message dropped (no receivers)");
                0
            }
        }
    }

    fn messages_published(&self) -> u64 {
        self.messages_published.load(Ordering::Relaxed)
    }
}
