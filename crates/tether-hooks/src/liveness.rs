use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Closure handed to an async operation; returns whether its owner is still
/// mounted at the moment it is called.
pub type IsActive = Rc<dyn Fn() -> bool>;

/// Mounted flag of one hook instance. Clones share the flag.
#[derive(Clone, Debug, Default)]
pub struct Liveness(Arc<AtomicBool>);

impl Liveness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub(crate) fn set(&self, alive: bool) {
        self.0.store(alive, Ordering::Release);
    }

    /// Checker that reads the flag on every call, not when it was created.
    pub fn checker(&self) -> IsActive {
        let flag = self.clone();
        Rc::new(move || flag.is_alive())
    }
}
