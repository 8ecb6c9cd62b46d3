//! Broadcast bus - fan-out messaging between independent contexts.
//!
//! Open client contexts (browser tabs, desktop windows, test harnesses)
//! keep their caches converged by publishing each confirmed mutation on a
//! shared, named channel.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │           BroadcastChannel (one per context)                 │
//! │  - named topic, own origin id                               │
//! │  - post(message) / recv(timeout)                            │
//! │  - never delivers a context its own messages                │
//! └─────────────────────────────────────────────────────────────┘
//!                            │
//!                            ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │              Publisher + Subscriber Traits                   │
//! │  Publisher: publish(event) / publish_batch(events)          │
//! │  Subscriber: poll(timeout)                                  │
//! └─────────────────────────────────────────────────────────────┘
//!          │                                    │
//!          ▼                                    ▼
//! ┌─────────────┐                    ┌─────────────────────┐
//! │InMemoryQueue│                    │ Redis pub/sub, NATS │
//! │ (included)  │                    │    (external)       │
//! └─────────────┘                    └─────────────────────┘
//! ```
//!
//! Delivery is at most once per subscriber. Nothing is persisted for
//! contexts that subscribe later; they catch up through their own
//! revalidation.

mod channel;
mod in_memory_queue;
mod publisher;
mod subscriber;

pub use channel::{BroadcastChannel, ORIGIN_KEY};
pub use in_memory_queue::InMemoryQueue;
pub use publisher::{Event, PublishError, Publisher};
pub use subscriber::Subscriber;
