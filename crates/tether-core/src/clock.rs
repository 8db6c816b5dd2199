use std::time::Duration;

use parking_lot::Mutex;
use web_time::Instant;

/// Time source for executor timers.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Instant;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock you can drive deterministically. Time only moves through
/// [`ManualClock::advance`] and [`ManualClock::set`].
pub struct ManualClock {
    t: Mutex<Instant>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(t: Instant) -> Self {
        Self { t: Mutex::new(t) }
    }

    pub fn advance(&self, by: Duration) {
        *self.t.lock() += by;
    }

    /// Moves the clock to `t`. Never moves backwards.
    pub fn set(&self, t: Instant) {
        let mut cur = self.t.lock();
        if t > *cur {
            *cur = t;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.t.lock()
    }
}
