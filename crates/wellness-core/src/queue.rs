//! Bounded FIFO queue with drop-on-full producers and suspending consumers

use crate::{Error, Result};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use tokio::sync::Notify;

/// Fixed-capacity FIFO buffer shared between producers and consumers.
///
/// Producers never wait: [`try_enqueue`](Self::try_enqueue) hands the item
/// back when the queue is full or closed. Consumers suspend in
/// [`recv`](Self::recv) until an item arrives or the queue is closed and
/// empty. All three operations take the same lock, so they are linearizable
/// with respect to each other.
pub struct BoundedQueue<T> {
    inner: Mutex<QueueInner<T>>,
    capacity: usize,
    available: Notify,
}

struct QueueInner<T> {
    items: VecDeque<T>,
    closed: bool,
}

impl<T> BoundedQueue<T> {
    /// Create a queue holding at most `capacity` items
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::queue("capacity must be greater than zero"));
        }

        Ok(Self {
            inner: Mutex::new(QueueInner {
                items: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            capacity,
            available: Notify::new(),
        })
    }

    /// Append an item without blocking.
    ///
    /// Returns the item inside the error when the queue is full or closed.
    pub fn try_enqueue(&self, item: T) -> std::result::Result<(), TryEnqueueError<T>> {
        {
            let mut inner = self.inner.lock();
            if inner.closed {
                return Err(TryEnqueueError::Closed(item));
            }
            if inner.items.len() >= self.capacity {
                return Err(TryEnqueueError::Full(item));
            }
            inner.items.push_back(item);
        }

        self.available.notify_one();
        Ok(())
    }

    /// Wait for the next item.
    ///
    /// Returns `None` once the queue is closed and every buffered item has
    /// been handed out. Dropping the future before it completes loses
    /// nothing, which makes it safe to race against shutdown signals.
    pub async fn recv(&self) -> Option<T> {
        loop {
            let notified = self.available.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut inner = self.inner.lock();
                if let Some(item) = inner.items.pop_front() {
                    return Some(item);
                }
                if inner.closed {
                    return None;
                }
            }

            notified.await;
        }
    }

    /// Take the next item if one is buffered
    pub fn try_recv(&self) -> Option<T> {
        self.inner.lock().items.pop_front()
    }

    /// Forbid further enqueues and wake every suspended consumer.
    ///
    /// Returns `true` only for the call that actually closed the queue.
    pub fn close(&self) -> bool {
        let newly_closed = {
            let mut inner = self.inner.lock();
            !std::mem::replace(&mut inner.closed, true)
        };

        self.available.notify_waiters();
        newly_closed
    }

    /// Whether [`close`](Self::close) has been called
    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    /// Closed and fully drained: no item will ever be returned again
    pub fn is_exhausted(&self) -> bool {
        let inner = self.inner.lock();
        inner.closed && inner.items.is_empty()
    }

    /// Number of buffered items
    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    /// Check if no items are buffered
    pub fn is_empty(&self) -> bool {
        self.inner.lock().items.is_empty()
    }

    /// Maximum number of buffered items
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T> fmt::Debug for BoundedQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("BoundedQueue")
            .field("capacity", &self.capacity)
            .field("len", &inner.items.len())
            .field("closed", &inner.closed)
            .finish()
    }
}

/// Rejected enqueue, carrying the item back to the producer
pub enum TryEnqueueError<T> {
    /// The queue was at capacity
    Full(T),
    /// The queue was closed
    Closed(T),
}

impl<T> TryEnqueueError<T> {
    /// Recover the rejected item
    pub fn into_inner(self) -> T {
        match self {
            Self::Full(item) | Self::Closed(item) => item,
        }
    }

    /// Check if the rejection was due to capacity
    pub fn is_full(&self) -> bool {
        matches!(self, Self::Full(_))
    }

    /// Check if the rejection was due to closure
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed(_))
    }
}

impl<T> fmt::Debug for TryEnqueueError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full(_) => f.write_str("Full(..)"),
            Self::Closed(_) => f.write_str("Closed(..)"),
        }
    }
}

impl<T> fmt::Display for TryEnqueueError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full(_) => f.write_str("queue is full"),
            Self::Closed(_) => f.write_str("queue is closed"),
        }
    }
}

impl<T> std::error::Error for TryEnqueueError<T> {}
