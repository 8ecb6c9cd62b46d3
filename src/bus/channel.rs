//! Named broadcast channel over a publisher/subscriber pair.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::{Event, InMemoryQueue, PublishError, Publisher, Subscriber};
use crate::clock::now_millis;

/// Metadata key carrying the id of the context that posted an event.
pub const ORIGIN_KEY: &str = "origin";

static NEXT_ORIGIN: AtomicU64 = AtomicU64::new(1);

/// A same-origin broadcast channel, one instance per context.
///
/// Messages are JSON payloads posted under the channel name. Receivers
/// skip events addressed to other channels and events they posted
/// themselves, matching the semantics of a browser `BroadcastChannel`.
///
/// ## Example
///
/// ```
/// use catalog_sync::bus::{BroadcastChannel, InMemoryQueue};
/// use serde_json::json;
///
/// let queue = InMemoryQueue::new();
/// let tab_a = BroadcastChannel::in_memory("catalog-data", &queue);
/// let tab_b = BroadcastChannel::in_memory("catalog-data", &queue);
///
/// tab_a.post(&json!({ "type": "REFRESH_ALL" })).unwrap();
///
/// let got: Option<serde_json::Value> = tab_b.recv(10).unwrap();
/// assert_eq!(got.unwrap()["type"], "REFRESH_ALL");
/// assert!(tab_a.recv::<serde_json::Value>(0).unwrap().is_none());
/// ```
pub struct BroadcastChannel<P, S> {
    name: String,
    origin: String,
    seq: AtomicU64,
    publisher: P,
    subscriber: S,
}

impl<P: Publisher, S: Subscriber> BroadcastChannel<P, S> {
    /// Join channel `name` with a fresh origin id.
    pub fn new(name: impl Into<String>, publisher: P, subscriber: S) -> Self {
        let origin = format!(
            "ctx-{}-{}",
            now_millis(),
            NEXT_ORIGIN.fetch_add(1, Ordering::Relaxed)
        );
        Self {
            name: name.into(),
            origin,
            seq: AtomicU64::new(0),
            publisher,
            subscriber,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identifier of this context on the channel.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Post a message to every other context on the channel.
    pub fn post<T: Serialize>(&self, message: &T) -> Result<(), PublishError> {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let id = format!("{}-{}", self.origin, seq);
        let event = Event::encode(id, &self.name, message)?.with_metadata(ORIGIN_KEY, &self.origin);
        self.publisher.publish(event)
    }

    /// Receive the next message from another context, waiting up to `timeout_ms`.
    ///
    /// Payloads that do not decode as `T` are dropped.
    pub fn recv<T: DeserializeOwned>(&self, timeout_ms: u64) -> Result<Option<T>, PublishError> {
        loop {
            let event = match self.subscriber.poll(timeout_ms)? {
                Some(event) => event,
                None => return Ok(None),
            };

            if event.event_type != self.name || event.meta(ORIGIN_KEY) == Some(self.origin.as_str()) {
                continue;
            }

            match event.decode::<T>() {
                Ok(message) => return Ok(Some(message)),
                Err(err) => {
                    debug!(channel = %self.name, event = %event.id, error = %err, "dropping undecodable message");
                }
            }
        }
    }
}

impl BroadcastChannel<InMemoryQueue, InMemoryQueue> {
    /// Join channel `name` on an in-process queue.
    pub fn in_memory(name: impl Into<String>, queue: &InMemoryQueue) -> Self {
        Self::new(name, queue.clone(), queue.new_subscriber())
    }
}
