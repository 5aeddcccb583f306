//! # Shared Bus - In-Memory Publish/Subscribe Transport
//!
//! Carries relay traffic over four logical channels.
//!
//! ## Channel Layout
//!
//! ```text
//! ┌──────────────┐  device-inbound   ┌──────────────┐  cloud-outbound   ┌──────────────┐
//! │   Devices    │ ────────────────▶ │              │ ────────────────▶ │    Cloud     │
//! │              │                   │    Relay     │                   │              │
//! │              │ ◀──────────────── │              │ ◀──────────────── │              │
//! └──────────────┘  device-outbound  └──────────────┘   cloud-inbound   └──────────────┘
//! ```
//!
//! ## Delivery
//!
//! - Fan-out to every subscription whose filter selects the channel.
//! - No persistence and no redelivery; slow subscribers lag and lose messages.
//! - Publishing to a channel nobody selects drops the message and reports 0.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{BusMessage, EventFilter};
pub use publisher::{BusPublisher, InMemoryBus};
pub use subscriber::{EventStream, Subscription, SubscriptionError};

/// Maximum messages to buffer per subscriber before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
