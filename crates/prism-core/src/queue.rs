//! Bounded blocking queues connecting the pipeline stages.
//!
//! `BoundedQueue` is the sole flow-control mechanism between stages: a slow
//! consumer fills its input queue, which blocks the producing stage, and the
//! backpressure propagates upstream all the way to job submission. Shutdown
//! is close-based: `close()` wakes every blocked caller, remaining items are
//! still delivered, and `get` returns `None` once the queue is drained.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

/// Default capacity at each stage boundary.
pub const DEFAULT_CAPACITY: usize = 16;

/// Error returned by `put` on a closed queue, handing the item back.
#[derive(Debug)]
pub struct Closed<T>(pub T);

struct Inner<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// A fixed-capacity blocking FIFO.
///
/// `put` blocks while the queue is full and never drops an item; `get` blocks
/// while the queue is empty. Multiple producers and multiple consumers may
/// share one queue; every item put is returned by exactly one `get`.
pub struct BoundedQueue<T> {
    capacity: usize,
    inner: Mutex<Inner<T>>,
    not_full: Condvar,
    not_empty: Condvar,
}

impl<T> BoundedQueue<T> {
    /// Create a queue holding at most `capacity` items.
    ///
    /// A zero capacity is bumped to 1; a rendezvous queue has no use here.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(Inner {
                items: VecDeque::with_capacity(capacity.max(1)),
                closed: false,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
        }
    }

    /// Enqueue an item, blocking while the queue is full.
    ///
    /// Returns `Err(Closed(item))` if the queue was closed before the item
    /// could be enqueued, so the caller can account for it instead of losing
    /// it silently.
    pub fn put(&self, item: T) -> std::result::Result<(), Closed<T>> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        while inner.items.len() >= self.capacity && !inner.closed {
            inner = self
                .not_full
                .wait(inner)
                .unwrap_or_else(|e| e.into_inner());
        }
        if inner.closed {
            return Err(Closed(item));
        }
        inner.items.push_back(item);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Dequeue the oldest item, blocking while the queue is empty.
    ///
    /// Returns `None` only after `close()` has been called and every queued
    /// item has been delivered.
    pub fn get(&self) -> Option<T> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        loop {
            if let Some(item) = inner.items.pop_front() {
                self.not_full.notify_one();
                return Some(item);
            }
            if inner.closed {
                return None;
            }
            inner = self
                .not_empty
                .wait(inner)
                .unwrap_or_else(|e| e.into_inner());
        }
    }

    /// Close the queue, waking all blocked producers and consumers.
    ///
    /// Idempotent. Items already queued are still delivered by `get`; further
    /// `put` calls fail with `Closed`.
    pub fn close(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.closed = true;
        self.not_full.notify_all();
        self.not_empty.notify_all();
    }

    /// Number of items currently queued.
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .items
            .len()
    }

    /// Whether the queue is currently empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The fixed capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
