//! # Executor
//!
//! Single-threaded cooperative task loop. Tasks are `!Send` futures polled on
//! the thread that owns the `Executor`; nothing blocks except [`Executor::run`]
//! on a system clock, which sleeps the thread until the next timer.
//!
//! ```rust
//! use std::time::Duration;
//! use tether_core::*;
//!
//! let rt = Executor::manual();
//! rt.enter(|| {
//!     spawn_local(async {
//!         sleep(Duration::from_millis(500)).await;
//!         log::info!("half a second later");
//!     })
//! })
//! .expect("spawn");
//! rt.advance(Duration::from_millis(500)).expect("manual clock");
//! ```
//!
//! Timers are driven by the executor's [`Clock`]. With [`Executor::manual`]
//! time only moves through [`Executor::advance`], which makes async
//! lifecycles fully deterministic in tests.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::task::{Context, Poll, Waker};
use std::time::Duration;

use futures::executor::{LocalPool, LocalSpawner};
use futures::task::LocalSpawnExt;
use web_time::Instant;

use crate::clock::{Clock, ManualClock, SystemClock};
use crate::error::RuntimeError;

thread_local! {
    static CURRENT_EXECUTOR: RefCell<Option<Weak<Shared>>> = const { RefCell::new(None) };
}

type TimerKey = (Instant, u64);

#[derive(Default)]
struct TimerQueue {
    next_seq: u64,
    entries: BTreeMap<TimerKey, Waker>,
}

impl TimerQueue {
    fn insert(&mut self, deadline: Instant, waker: Waker) -> TimerKey {
        let key = (deadline, self.next_seq);
        self.next_seq += 1;
        self.entries.insert(key, waker);
        key
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.entries.keys().next().map(|(t, _)| *t)
    }

    fn take_due(&mut self, now: Instant) -> Vec<Waker> {
        let pending = self.entries.split_off(&(now, u64::MAX));
        std::mem::replace(&mut self.entries, pending)
            .into_values()
            .collect()
    }
}

struct Shared {
    spawner: LocalSpawner,
    clock: Arc<dyn Clock>,
    timers: RefCell<TimerQueue>,
}

pub struct Executor {
    pool: RefCell<LocalPool>,
    shared: Rc<Shared>,
    manual: Option<Arc<ManualClock>>,
}

impl Executor {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::build(clock, None)
    }

    /// Executor on the wall clock.
    pub fn system() -> Self {
        Self::new(Arc::new(SystemClock))
    }

    /// Executor on a [`ManualClock`] starting at the current instant.
    pub fn manual() -> Self {
        let clock = Arc::new(ManualClock::new());
        Self::build(clock.clone(), Some(clock))
    }

    fn build(clock: Arc<dyn Clock>, manual: Option<Arc<ManualClock>>) -> Self {
        let pool = LocalPool::new();
        let shared = Rc::new(Shared {
            spawner: pool.spawner(),
            clock,
            timers: RefCell::new(TimerQueue::default()),
        });
        Self {
            pool: RefCell::new(pool),
            shared,
            manual,
        }
    }

    pub fn now(&self) -> Instant {
        self.shared.clock.now()
    }

    pub fn is_manual(&self) -> bool {
        self.manual.is_some()
    }

    /// Runs `f` with this executor installed as the thread's current one, so
    /// [`spawn_local`] and [`sleep`] inside it resolve to this executor.
    pub fn enter<R>(&self, f: impl FnOnce() -> R) -> R {
        let prev = CURRENT_EXECUTOR.with(|cur| {
            cur.borrow_mut()
                .replace(Rc::downgrade(&self.shared))
        });
        let result = f();
        CURRENT_EXECUTOR.with(|cur| *cur.borrow_mut() = prev);
        result
    }

    pub fn spawn(&self, fut: impl Future<Output = ()> + 'static) -> Result<(), RuntimeError> {
        self.shared.spawner.spawn_local(fut)?;
        Ok(())
    }

    /// Polls every task that can make progress without time moving.
    pub fn run_until_stalled(&self) {
        self.enter(|| match self.pool.try_borrow_mut() {
            Ok(mut pool) => pool.run_until_stalled(),
            Err(_) => log::warn!("run_until_stalled re-entered from a task; ignoring"),
        })
    }

    /// Moves a manual clock forward by `by`, firing every timer that falls due
    /// on the way in deadline order and running tasks after each one.
    pub fn advance(&self, by: Duration) -> Result<(), RuntimeError> {
        let clock = self.manual.as_ref().ok_or(RuntimeError::ClockNotManual)?;
        let target = clock.now() + by;

        self.run_until_stalled();
        while let Some(deadline) = self.next_deadline() {
            if deadline > target {
                break;
            }
            clock.set(deadline);
            self.fire_due(deadline);
            self.run_until_stalled();
        }
        clock.set(target);
        Ok(())
    }

    /// Drives tasks until none can progress and no timer is pending. A manual
    /// clock jumps straight to each deadline; the system clock sleeps.
    pub fn run(&self) {
        loop {
            self.run_until_stalled();
            let Some(deadline) = self.next_deadline() else {
                break;
            };
            match &self.manual {
                Some(clock) => clock.set(deadline),
                None => {
                    let now = self.now();
                    if deadline > now {
                        std::thread::sleep(deadline - now);
                    }
                }
            }
            self.fire_due(self.now());
        }
    }

    pub fn pending_timers(&self) -> usize {
        self.shared.timers.borrow().entries.len()
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.shared.timers.borrow().next_deadline()
    }

    fn fire_due(&self, now: Instant) {
        let due = self.shared.timers.borrow_mut().take_due(now);
        if !due.is_empty() {
            log::trace!("firing {} timer(s)", due.len());
        }
        for waker in due {
            waker.wake();
        }
    }
}

fn current() -> Option<Rc<Shared>> {
    CURRENT_EXECUTOR.with(|cur| cur.borrow().as_ref().and_then(Weak::upgrade))
}

/// Whether an executor is entered on this thread.
pub fn has_executor() -> bool {
    current().is_some()
}

/// Queues `fut` on the current executor (see [`Executor::enter`]).
pub fn spawn_local(fut: impl Future<Output = ()> + 'static) -> Result<(), RuntimeError> {
    let shared = current().ok_or(RuntimeError::NoExecutor)?;
    shared.spawner.spawn_local(fut)?;
    Ok(())
}

/// Completes once `duration` has elapsed on the current executor's clock,
/// measured from the first poll.
pub fn sleep(duration: Duration) -> Sleep {
    Sleep {
        duration,
        deadline: None,
        registered: None,
        shared: Weak::new(),
    }
}

pub struct Sleep {
    duration: Duration,
    deadline: Option<Instant>,
    registered: Option<TimerKey>,
    shared: Weak<Shared>,
}

impl Sleep {
    fn unregister(&mut self) {
        if let (Some(key), Some(shared)) = (self.registered.take(), self.shared.upgrade()) {
            shared.timers.borrow_mut().entries.remove(&key);
        }
    }
}

impl Future for Sleep {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let this = self.get_mut();

        let shared = match this.shared.upgrade() {
            Some(shared) => shared,
            None => match current() {
                Some(shared) => {
                    this.shared = Rc::downgrade(&shared);
                    shared
                }
                None => {
                    log::error!("sleep polled outside of an executor; completing immediately");
                    return Poll::Ready(());
                }
            },
        };

        let now = shared.clock.now();
        let deadline = *this.deadline.get_or_insert(now + this.duration);
        if now >= deadline {
            this.unregister();
            return Poll::Ready(());
        }

        this.unregister();
        let key = shared
            .timers
            .borrow_mut()
            .insert(deadline, cx.waker().clone());
        this.registered = Some(key);
        Poll::Pending
    }
}

impl Drop for Sleep {
    fn drop(&mut self) {
        self.unregister();
    }
}
