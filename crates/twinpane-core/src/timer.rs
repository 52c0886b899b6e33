//! Cancellable single-shot timers without runtime timer identity.
//!
//! The core never schedules anything itself. Arming a [`TimerSlot`] hands
//! out a [`TimerToken`]; the host schedules a real timer and reports the token
//! back when it fires. Re-arming or cancelling invalidates earlier tokens, so
//! a late callback from a superseded timer is a no-op.

use std::time::Duration;

use web_time::Instant;

/// Identifies one arming of a [`TimerSlot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

impl TimerToken {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// What a session's timer is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Debounced history commit after typing settles.
    HistoryCommit,
    /// Fallback release of an outline-click lock.
    LockRelease,
}

/// Ask the host to call back after `delay` with `token`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerRequest {
    pub kind: TimerKind,
    pub token: TimerToken,
    pub delay: Duration,
}

#[derive(Debug, Clone, Copy)]
struct Armed {
    token: TimerToken,
    deadline: Instant,
}

/// A slot holding at most one live timer.
#[derive(Debug, Clone, Default)]
pub struct TimerSlot {
    generation: u64,
    armed: Option<Armed>,
}

impl TimerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the slot, replacing (and invalidating) any live timer.
    pub fn arm(&mut self, now: Instant, delay: Duration) -> TimerToken {
        self.generation = self.generation.wrapping_add(1);
        let token = TimerToken(self.generation);
        self.armed = Some(Armed {
            token,
            deadline: now + delay,
        });
        token
    }

    /// Disarm the slot. Returns the token that was live, if any.
    pub fn cancel(&mut self) -> Option<TimerToken> {
        self.armed.take().map(|a| a.token)
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    pub fn token(&self) -> Option<TimerToken> {
        self.armed.map(|a| a.token)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.armed.map(|a| a.deadline)
    }

    /// Consume a host callback. True only for the live token; disarms on success.
    pub fn fire(&mut self, token: TimerToken) -> bool {
        match self.armed {
            Some(armed) if armed.token == token => {
                self.armed = None;
                true
            }
            _ => false,
        }
    }

    /// Poll-style firing: disarm and return the token if the deadline passed.
    pub fn fire_due(&mut self, now: Instant) -> Option<TimerToken> {
        let armed = self.armed?;
        if now >= armed.deadline {
            self.armed = None;
            Some(armed.token)
        } else {
            None
        }
    }
}
