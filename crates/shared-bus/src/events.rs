//! # Bus Messages
//!
//! The unit of delivery on the bus and the filters subscribers use to
//! select channels.

use serde::{Deserialize, Serialize};
use shared_types::{current_timestamp_ms, Channel, Timestamp};
use uuid::Uuid;

/// A payload published on one logical channel.
///
/// The bus never inspects `payload`; for relay traffic it is the JSON wire
/// form of a sealed envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusMessage {
    /// Unique id assigned at publish time.
    pub id: Uuid,
    /// Channel the message was published to.
    pub channel: Channel,
    /// Opaque bytes.
    pub payload: Vec<u8>,
    /// Bus clock at publish time (epoch ms).
    pub published_at: Timestamp,
}

impl BusMessage {
    /// Wrap `payload` for `channel`, stamping id and publish time.
    #[must_use]
    pub fn new(channel: Channel, payload: Vec<u8>) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel,
            payload,
            published_at: current_timestamp_ms(),
        }
    }
}

/// Filter for subscribing to specific channels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Channels to include. Empty means all channels.
    pub channels: Vec<Channel>,
}

impl EventFilter {
    /// Create a filter that accepts all messages.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific channels.
    #[must_use]
    pub fn channels(channels: Vec<Channel>) -> Self {
        Self { channels }
    }

    /// Create a filter for a single channel.
    #[must_use]
    pub fn channel(channel: Channel) -> Self {
        Self::channels(vec![channel])
    }

    /// Check if a channel is selected by this filter.
    #[must_use]
    pub fn accepts(&self, channel: Channel) -> bool {
        self.channels.is_empty() || self.channels.contains(&channel)
    }

    /// Check if a message matches this filter.
    #[must_use]
    pub fn matches(&self, message: &BusMessage) -> bool {
        self.accepts(message.channel)
    }

    /// Channels this filter selects, expanded from the empty wildcard.
    #[must_use]
    pub fn selected(&self) -> Vec<Channel> {
        Channel::ALL
            .into_iter()
            .filter(|c| self.accepts(*c))
            .collect()
    }
}
