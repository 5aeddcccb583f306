//! # Relay Entities
//!
//! Directions and transport channels shared by the bus, the pipeline and
//! the runtime.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Milliseconds since the Unix epoch.
pub type Timestamp = u64;

/// Logical transport channels.
///
/// The relay subscribes to the two `*-inbound` channels and publishes to
/// the `*-outbound` channel of the opposite side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Channel {
    /// Traffic produced by field devices.
    DeviceInbound,
    /// Traffic produced by the cloud endpoint.
    CloudInbound,
    /// Traffic delivered to field devices.
    DeviceOutbound,
    /// Traffic delivered to the cloud endpoint.
    CloudOutbound,
}

impl Channel {
    /// All channels, ingress first.
    pub const ALL: [Channel; 4] = [
        Channel::DeviceInbound,
        Channel::CloudInbound,
        Channel::DeviceOutbound,
        Channel::CloudOutbound,
    ];

    /// Stable topic name of the channel.
    #[must_use]
    pub fn topic(&self) -> &'static str {
        match self {
            Self::DeviceInbound => "device-inbound",
            Self::CloudInbound => "cloud-inbound",
            Self::DeviceOutbound => "device-outbound",
            Self::CloudOutbound => "cloud-outbound",
        }
    }

    /// Whether the relay consumes from this channel.
    #[must_use]
    pub fn is_ingress(&self) -> bool {
        matches!(self, Self::DeviceInbound | Self::CloudInbound)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.topic())
    }
}

/// Which way a message travels through the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// Device telemetry heading to the cloud.
    DeviceToCloud,
    /// Cloud control traffic heading to devices.
    CloudToDevice,
}

impl Direction {
    /// Both directions.
    pub const BOTH: [Direction; 2] = [Direction::DeviceToCloud, Direction::CloudToDevice];

    /// Channel the relay reads this direction's traffic from.
    #[must_use]
    pub fn ingress(&self) -> Channel {
        match self {
            Self::DeviceToCloud => Channel::DeviceInbound,
            Self::CloudToDevice => Channel::CloudInbound,
        }
    }

    /// Channel a forwarded message is published to.
    #[must_use]
    pub fn egress(&self) -> Channel {
        match self {
            Self::DeviceToCloud => Channel::CloudOutbound,
            Self::CloudToDevice => Channel::DeviceOutbound,
        }
    }

    /// The reverse leg.
    #[must_use]
    pub fn opposite(&self) -> Direction {
        match self {
            Self::DeviceToCloud => Self::CloudToDevice,
            Self::CloudToDevice => Self::DeviceToCloud,
        }
    }

    /// Short label used in logs, metrics and detection events.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::DeviceToCloud => "device-to-cloud",
            Self::CloudToDevice => "cloud-to-device",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
