//! In-memory fan-out queue for tests and single-process deployments.
//!
//! Stands in for a cross-context broadcast primitive: one shared log,
//! one read position per subscriber.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use super::{Event, PublishError, Publisher, Subscriber};

/// In-memory queue implementing both `Publisher` and `Subscriber`.
///
/// Features:
/// - Thread-safe (can be shared across threads via `Clone`)
/// - Each subscriber from `new_subscriber()` tracks its own position
/// - Subscribers start at the current end of the log, so events published
///   before a subscriber existed are never replayed to it
/// - Events every live subscriber has read are dropped from the log
///
/// The handle returned by `new()` only publishes; polling it yields nothing.
///
/// ## Example
///
/// ```
/// use catalog_sync::bus::{InMemoryQueue, Publisher, Subscriber, Event};
///
/// let queue = InMemoryQueue::new();
/// let tab_a = queue.new_subscriber();
///
/// queue.publish(Event::with_string_payload("evt-1", "catalog-data", "{}")).unwrap();
///
/// let tab_b = queue.new_subscriber();
/// assert_eq!(tab_a.poll(10).unwrap().unwrap().id, "evt-1");
/// assert!(tab_b.poll(10).unwrap().is_none());
/// assert!(queue.is_empty());
/// ```
#[derive(Clone)]
pub struct InMemoryQueue {
    log: Arc<Mutex<Log>>,
    /// Read position of this subscriber, shared by its clones
    cursor: Option<Arc<Cursor>>,
}

struct Log {
    events: VecDeque<Event>,
    /// Absolute index of `events[0]`
    base: u64,
    cursors: HashMap<u64, u64>,
    next_cursor: u64,
}

impl Log {
    fn end(&self) -> u64 {
        self.base + self.events.len() as u64
    }

    fn compact(&mut self) {
        let end = self.end();
        let min = self.cursors.values().copied().min().unwrap_or(end);
        while self.base < min {
            self.events.pop_front();
            self.base += 1;
        }
    }
}

struct Cursor {
    id: u64,
    log: Arc<Mutex<Log>>,
}

impl Drop for Cursor {
    fn drop(&mut self) {
        let mut log = self.log.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        log.cursors.remove(&self.id);
        log.compact();
    }
}

impl Default for InMemoryQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryQueue {
    /// Create a new in-memory queue.
    pub fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(Log {
                events: VecDeque::new(),
                base: 0,
                cursors: HashMap::new(),
                next_cursor: 0,
            })),
            cursor: None,
        }
    }

    /// Create a subscriber that shares the log and starts at its current end.
    ///
    /// The subscriber stops holding events back once it and all its clones
    /// are dropped.
    pub fn new_subscriber(&self) -> Self {
        let mut log = self.log.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let id = log.next_cursor;
        log.next_cursor += 1;
        let end = log.end();
        log.cursors.insert(id, end);
        drop(log);

        Self {
            log: Arc::clone(&self.log),
            cursor: Some(Arc::new(Cursor {
                id,
                log: Arc::clone(&self.log),
            })),
        }
    }

    /// Number of events still waiting for at least one subscriber.
    pub fn len(&self) -> usize {
        self.log.lock().map(|log| log.events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, Log>, PublishError> {
        self.log
            .lock()
            .map_err(|_| PublishError::ConnectionFailed("queue lock poisoned".into()))
    }
}

impl Publisher for InMemoryQueue {
    fn publish(&self, event: Event) -> Result<(), PublishError> {
        let mut log = self.lock()?;
        log.events.push_back(event);
        log.compact();
        Ok(())
    }

    fn publish_batch(&self, events: Vec<Event>) -> Result<(), PublishError> {
        let mut log = self.lock()?;
        log.events.extend(events);
        log.compact();
        Ok(())
    }
}

impl Subscriber for InMemoryQueue {
    fn poll(&self, timeout_ms: u64) -> Result<Option<Event>, PublishError> {
        let cursor = match &self.cursor {
            Some(cursor) => cursor,
            None => return Ok(None),
        };
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);

        loop {
            {
                let mut log = self.lock()?;
                let end = log.end();
                let pos = log.cursors.get(&cursor.id).copied().unwrap_or(end);

                if pos < end {
                    let event = log.events[(pos - log.base) as usize].clone();
                    log.cursors.insert(cursor.id, pos + 1);
                    log.compact();
                    return Ok(Some(event));
                }
            }

            if Instant::now() >= deadline {
                return Ok(None);
            }

            // Small sleep to avoid busy-waiting
            std::thread::sleep(Duration::from_millis(1));
        }
    }
}
