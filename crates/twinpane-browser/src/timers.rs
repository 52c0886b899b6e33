//! Browser scheduling for the core's timer requests.
//!
//! One `setTimeout` per timer kind. Scheduling a kind again drops (and so
//! clears) the previous timeout; the core's tokens make a callback that
//! slips through anyway harmless.

use gloo_timers::callback::Timeout;

use twinpane_core::{TimerKind, TimerRequest, TimerToken};

#[derive(Default)]
pub struct BrowserTimers {
    commit: Option<Timeout>,
    lock: Option<Timeout>,
}

impl BrowserTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `callback` with the request's kind and token once its delay passes.
    pub fn schedule<F>(&mut self, request: TimerRequest, callback: F)
    where
        F: FnOnce(TimerKind, TimerToken) + 'static,
    {
        let millis = u32::try_from(request.delay.as_millis()).unwrap_or(u32::MAX);
        let TimerRequest { kind, token, .. } = request;
        let timeout = Timeout::new(millis, move || callback(kind, token));
        *self.slot(kind) = Some(timeout);
    }

    pub fn cancel(&mut self, kind: TimerKind) {
        // Dropping a Timeout clears it.
        self.slot(kind).take();
    }

    fn slot(&mut self, kind: TimerKind) -> &mut Option<Timeout> {
        match kind {
            TimerKind::HistoryCommit => &mut self.commit,
            TimerKind::LockRelease => &mut self.lock,
        }
    }
}

impl std::fmt::Debug for BrowserTimers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserTimers")
            .field("commit", &self.commit.is_some())
            .field("lock", &self.lock.is_some())
            .finish()
    }
}
