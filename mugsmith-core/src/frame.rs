//! Per-frame coalescing of pending visual updates.
//!
//! Pointer-move events can arrive many times per display frame. The
//! scheduler keeps at most one pending update: scheduling a new one replaces
//! (and drops) the previous, and the host takes the survivor once per frame.

/// Token identifying one scheduled update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameToken(u64);

/// Single-slot scheduler that drops superseded updates.
#[derive(Debug)]
pub struct FrameScheduler<T> {
    pending: Option<(FrameToken, T)>,
    next_token: u64,
    superseded: u64,
    delivered: u64,
}

impl<T> Default for FrameScheduler<T> {
    fn default() -> Self {
        Self {
            pending: None,
            next_token: 0,
            superseded: 0,
            delivered: 0,
        }
    }
}

impl<T> FrameScheduler<T> {
    /// Create an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `update` for the next frame, replacing any pending one.
    pub fn schedule(&mut self, update: T) -> FrameToken {
        self.next_token += 1;
        let token = FrameToken(self.next_token);
        if self.pending.replace((token, update)).is_some() {
            self.superseded += 1;
        }
        token
    }

    /// Cancel a scheduled update if it is still the pending one.
    ///
    /// Returns `true` if something was cancelled.
    pub fn cancel(&mut self, token: FrameToken) -> bool {
        if self.pending.as_ref().is_some_and(|(t, _)| *t == token) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Drop whatever is pending.
    pub fn clear(&mut self) {
        self.pending = None;
    }

    /// Take the pending update for this frame.
    pub fn take(&mut self) -> Option<T> {
        let (_, update) = self.pending.take()?;
        self.delivered += 1;
        Some(update)
    }

    /// Whether an update is waiting for the next frame.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Number of updates dropped because a newer one replaced them.
    #[must_use]
    pub fn superseded(&self) -> u64 {
        self.superseded
    }

    /// Number of updates handed out by [`take`](Self::take).
    #[must_use]
    pub fn delivered(&self) -> u64 {
        self.delivered
    }
}
