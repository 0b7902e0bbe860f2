//! Transport-neutral session handle.
//!
//! A [`SessionHandle`] is the coordinator's only view of a connected client:
//! an identity, a bounded outbound event buffer, and a one-shot liveness
//! signal. Whatever transport backs the session drains events with
//! [`SessionHandle::recv`] and calls [`SessionHandle::close`] when the client
//! goes away.
//!
//! Delivery never blocks the sender. When the buffer is full the oldest event
//! is evicted: a stale snapshot is worthless once a newer one exists, so
//! recency wins over completeness.

use std::{
    collections::VecDeque,
    fmt,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
};

use termplay_core::SessionId;
use termplay_proto::Event;
use tokio::sync::{Notify, watch};

/// Cheaply clonable handle to one connected client.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<Inner>,
}

struct Inner {
    id: SessionId,
    capacity: usize,
    queue: Mutex<VecDeque<Event>>,
    /// Wakes a pending `recv` when an event arrives
    notify: Notify,
    /// Events evicted by the drop-oldest policy
    dropped: AtomicU64,
    /// Flips to `true` exactly once
    closed: watch::Sender<bool>,
}

impl SessionHandle {
    /// Create a handle with room for `capacity` undelivered events.
    ///
    /// A zero capacity is treated as one.
    pub fn new(id: impl Into<SessionId>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (closed, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                id: id.into(),
                capacity,
                queue: Mutex::new(VecDeque::with_capacity(capacity)),
                notify: Notify::new(),
                dropped: AtomicU64::new(0),
                closed,
            }),
        }
    }

    /// Session identity.
    pub fn id(&self) -> &SessionId {
        &self.inner.id
    }

    /// Queue an event for the client without blocking.
    ///
    /// Returns `false` if the session is closed (the event is discarded).
    /// A full buffer evicts its oldest event to make room.
    pub fn send(&self, event: Event) -> bool {
        if self.is_closed() {
            return false;
        }

        {
            let mut queue = self.inner.queue.lock().unwrap_or_else(PoisonError::into_inner);
            if queue.len() >= self.inner.capacity {
                if let Some(evicted) = queue.pop_front() {
                    self.inner.dropped.fetch_add(1, Ordering::Relaxed);
                    tracing::trace!(
                        session_id = %self.inner.id,
                        evicted = evicted.kind(),
                        "session buffer full, evicting oldest event"
                    );
                }
            }
            queue.push_back(event);
        }

        self.inner.notify.notify_one();
        true
    }

    /// Take the oldest buffered event, if any.
    pub fn try_recv(&self) -> Option<Event> {
        self.inner.queue.lock().unwrap_or_else(PoisonError::into_inner).pop_front()
    }

    /// Wait for the next event.
    ///
    /// Returns `None` once the session is closed and its buffer drained.
    pub async fn recv(&self) -> Option<Event> {
        loop {
            if let Some(event) = self.try_recv() {
                return Some(event);
            }
            if self.is_closed() {
                return None;
            }

            tokio::select! {
                () = self.inner.notify.notified() => {},
                () = self.done() => {},
            }
        }
    }

    /// Close the session. Idempotent.
    ///
    /// Returns `true` only for the call that actually closed it.
    pub fn close(&self) -> bool {
        let closed_now = self.inner.closed.send_if_modified(|closed| {
            if *closed {
                false
            } else {
                *closed = true;
                true
            }
        });

        if closed_now {
            tracing::debug!(session_id = %self.inner.id, "session closed");
        }
        closed_now
    }

    /// Whether [`Self::close`] has been called.
    pub fn is_closed(&self) -> bool {
        *self.inner.closed.borrow()
    }

    /// Resolves once the session is closed (immediately if it already is).
    ///
    /// The returned future owns its own subscription, so it can be moved into
    /// a watcher task.
    pub fn done(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.inner.closed.subscribe();
        async move {
            loop {
                let closed = *rx.borrow_and_update();
                if closed {
                    return;
                }
                if rx.changed().await.is_err() {
                    return;
                }
            }
        }
    }

    /// Number of events evicted because the client fell behind.
    pub fn dropped_events(&self) -> u64 {
        self.inner.dropped.load(Ordering::Relaxed)
    }

    /// Number of events waiting to be drained.
    pub fn pending(&self) -> usize {
        self.inner.queue.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Buffer capacity.
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle")
            .field("id", &self.inner.id)
            .field("pending", &self.pending())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
