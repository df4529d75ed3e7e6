#![forbid(unsafe_code)]

//! Cancelable delayed actions.
//!
//! [`DeferredQueue`] replaces ad hoc timers with explicit deadlines. Nothing
//! fires on its own: the host passes `now` into [`poll`](DeferredQueue::poll)
//! on every frame, and every action whose deadline has passed is returned in
//! deadline order.
//!
//! # Example
//!
//! ```
//! use foldline_runtime::deferred::DeferredQueue;
//! use web_time::{Duration, Instant};
//!
//! let start = Instant::now();
//! let mut queue = DeferredQueue::new();
//! let handle = queue.schedule(start, Duration::from_millis(300), "advance");
//!
//! assert!(queue.poll(start + Duration::from_millis(100)).is_empty());
//! assert!(queue.cancel(handle));
//! assert!(!queue.cancel(handle)); // idempotent
//! assert!(queue.poll(start + Duration::from_secs(1)).is_empty());
//! ```
//!
//! # Ordering
//!
//! Cancellation takes effect immediately. An action canceled and replaced
//! within the same synchronous turn can never fire, because the queue is the
//! only place actions live and `cancel` removes the entry outright.

use web_time::{Duration, Instant};

/// Opaque identifier for a scheduled action.
///
/// Handles are never reused within one queue, so a stale handle can only
/// ever refer to an action that already fired or was canceled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeferredHandle(u64);

impl DeferredHandle {
    /// Raw sequence number, for logging.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// An action whose deadline has passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredAction<A> {
    pub handle: DeferredHandle,
    pub deadline: Instant,
    pub action: A,
}

/// Deadline-ordered set of pending actions.
#[derive(Debug, Clone)]
pub struct DeferredQueue<A> {
    pending: Vec<DeferredAction<A>>,
    next_id: u64,
}

impl<A> Default for DeferredQueue<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> DeferredQueue<A> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending: Vec::new(),
            next_id: 0,
        }
    }

    /// Schedule `action` to fire once `delay` has elapsed after `now`.
    pub fn schedule(&mut self, now: Instant, delay: Duration, action: A) -> DeferredHandle {
        let handle = DeferredHandle(self.next_id);
        self.next_id += 1;
        let deadline = now + delay;
        // Stable insert: equal deadlines keep scheduling order.
        let at = self.pending.partition_point(|p| p.deadline <= deadline);
        self.pending.insert(
            at,
            DeferredAction {
                handle,
                deadline,
                action,
            },
        );
        tracing::trace!(
            message = "deferred.schedule",
            handle = handle.0,
            delay_ms = delay.as_millis() as u64
        );
        handle
    }

    /// Prevent `handle` from firing.
    ///
    /// Returns `true` only if the action was still pending. Canceling a fired
    /// or already-canceled handle is a no-op.
    pub fn cancel(&mut self, handle: DeferredHandle) -> bool {
        match self.pending.iter().position(|p| p.handle == handle) {
            Some(idx) => {
                self.pending.remove(idx);
                tracing::trace!(message = "deferred.cancel", handle = handle.0);
                true
            }
            None => false,
        }
    }

    /// Whether `handle` is still waiting to fire.
    #[must_use]
    pub fn is_pending(&self, handle: DeferredHandle) -> bool {
        self.pending.iter().any(|p| p.handle == handle)
    }

    /// The action behind a pending handle.
    #[must_use]
    pub fn action(&self, handle: DeferredHandle) -> Option<&A> {
        self.pending
            .iter()
            .find(|p| p.handle == handle)
            .map(|p| &p.action)
    }

    /// Remove and return every action due at `now`, earliest first.
    pub fn poll(&mut self, now: Instant) -> Vec<DeferredAction<A>> {
        let due = self.pending.partition_point(|p| p.deadline <= now);
        self.pending.drain(..due).collect()
    }

    /// Deadline of the earliest pending action.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.first().map(|p| p.deadline)
    }

    /// Time left until the earliest pending action, saturating at zero.
    #[must_use]
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        self.next_deadline()
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Cancel everything.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
