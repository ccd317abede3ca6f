//! Cancellable timer slots owned by the session.
//!
//! The session clock is a plain millisecond counter supplied by the caller.
//! A slot holds at most one pending deadline; cancelling it guarantees the
//! activity cannot fire again until it is explicitly re-armed.

/// One-shot deadline that callers re-arm to get periodic behavior.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Timer {
    due: Option<u64>,
}

impl Timer {
    pub fn arm_at(&mut self, at: u64) {
        self.due = Some(at);
    }

    pub fn cancel(&mut self) {
        self.due = None;
    }

    pub fn is_armed(&self) -> bool {
        self.due.is_some()
    }

    pub fn due_at(&self) -> Option<u64> {
        self.due
    }

    /// Disarm and return the deadline if it has been reached.
    pub fn poll(&mut self, now: u64) -> Option<u64> {
        match self.due {
            Some(at) if at <= now => {
                self.due = None;
                Some(at)
            }
            _ => None,
        }
    }
}

/// Pending "advance on the next rendered frame" request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameRequest {
    pending: bool,
}

impl FrameRequest {
    pub fn request(&mut self) {
        self.pending = true;
    }

    pub fn cancel(&mut self) {
        self.pending = false;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Consume the request. The callback must request again to keep running.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }
}

/// Which periodic activity a fired deadline belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Activity {
    Spawn,
    Sweep,
    Clock,
}

/// Every recurring schedule of a playing session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionTimers {
    pub spawn: Timer,
    pub sweep: Timer,
    pub clock: Timer,
    pub frame: FrameRequest,
}

impl SessionTimers {
    pub fn cancel_all(&mut self) {
        self.spawn.cancel();
        self.sweep.cancel();
        self.clock.cancel();
        self.frame.cancel();
    }

    pub fn any_armed(&self) -> bool {
        self.spawn.is_armed()
            || self.sweep.is_armed()
            || self.clock.is_armed()
            || self.frame.is_pending()
    }

    /// Earliest deadline reached by `now`, disarmed and returned.
    ///
    /// Ties resolve spawn, then sweep, then clock.
    pub fn next_due(&mut self, now: u64) -> Option<(Activity, u64)> {
        let candidates = [
            (Activity::Spawn, self.spawn.due_at()),
            (Activity::Sweep, self.sweep.due_at()),
            (Activity::Clock, self.clock.due_at()),
        ];
        let (activity, at) = candidates
            .iter()
            .filter_map(|(activity, due)| due.filter(|at| *at <= now).map(|at| (*activity, at)))
            .min_by_key(|(_, at)| *at)?;

        match activity {
            Activity::Spawn => self.spawn.cancel(),
            Activity::Sweep => self.sweep.cancel(),
            Activity::Clock => self.clock.cancel(),
        }
        Some((activity, at))
    }
}
