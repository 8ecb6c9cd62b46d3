use super::message::CacheMessage;
use crate::bus::{BroadcastChannel, PublishError, Publisher, Subscriber};

/// The cross-context channel a cache posts to and drains.
pub trait CacheChannel: Send + Sync {
    fn name(&self) -> &str;

    fn send_message(&self, message: &CacheMessage) -> Result<(), PublishError>;

    /// Next message from another context, if one is waiting.
    fn next_message(&self) -> Result<Option<CacheMessage>, PublishError>;
}

impl<P: Publisher, S: Subscriber> CacheChannel for BroadcastChannel<P, S> {
    fn name(&self) -> &str {
        BroadcastChannel::name(self)
    }

    fn send_message(&self, message: &CacheMessage) -> Result<(), PublishError> {
        self.post(message)
    }

    fn next_message(&self) -> Result<Option<CacheMessage>, PublishError> {
        self.recv(0)
    }
}
