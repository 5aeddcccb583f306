//! # Inbound Port - RelayApi
//!
//! Primary driving port used by ingress handlers.

use crate::domain::{RelayError, RelayOutcome, RelaySnapshot};
use async_trait::async_trait;
use shared_types::Direction;

/// Primary API of the relay pipeline.
///
/// # Example
///
/// ```rust,ignore
/// async fn on_message(relay: &impl RelayApi, raw: &[u8]) {
///     match relay.relay(Direction::DeviceToCloud, raw).await {
///         Ok(RelayOutcome::Forwarded { destination, .. }) => { /* delivered */ }
///         Ok(RelayOutcome::Rejected(rejection)) => { /* event already recorded */ }
///         Err(e) => { /* transport failure, message lost */ }
///     }
/// }
/// ```
#[async_trait]
pub trait RelayApi: Send + Sync {
    /// Run one inbound wire message through the pipeline.
    ///
    /// Every rejection has already produced exactly one detection event by
    /// the time this returns.
    ///
    /// # Errors
    /// - `RelayError::Transport`: message passed every check but could not
    ///   be published
    /// - `RelayError::Seal`: re-encryption failed
    async fn relay(&self, direction: Direction, raw: &[u8]) -> Result<RelayOutcome, RelayError>;

    /// Counters from the pipeline, the window and the event dispatcher.
    fn snapshot(&self) -> RelaySnapshot;
}
