//! Core subscriber trait for the bus.

use super::publisher::{Event, PublishError};

/// Trait for receiving events from a message bus.
///
/// This is a pull-based interface: each subscriber instance has its own
/// read position, and every subscriber sees every event published after it
/// was created (fan-out).
pub trait Subscriber: Send + Sync {
    /// Poll for the next event, waiting up to `timeout_ms`.
    ///
    /// A timeout of 0 checks once and returns immediately.
    fn poll(&self, timeout_ms: u64) -> Result<Option<Event>, PublishError>;
}
