use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::reactive::{self, ObserverId};
use crate::scope::Scope;
use crate::view::View;

thread_local! {
    pub static COMPOSER: RefCell<Composer> = RefCell::new(Composer::default());
}

/// Slot table of one component instance.
#[derive(Default)]
pub struct Composer {
    pub slots: Vec<Box<dyn Any>>,
    pub cursor: usize,
    pub keyed_slots: HashMap<String, Box<dyn Any>>,
}

/// Swaps a composition's slot table into the thread-local composer for the
/// duration of a compose pass, and swaps it back out on drop.
pub struct ComposeGuard<'a> {
    slots: &'a RefCell<Composer>,
}

impl<'a> ComposeGuard<'a> {
    pub fn begin(slots: &'a RefCell<Composer>) -> Self {
        COMPOSER.with(|c| {
            let mut c = c.borrow_mut();
            let mut own = slots.borrow_mut();
            std::mem::swap(&mut *c, &mut *own);
            c.cursor = 0;
        });
        ComposeGuard { slots }
    }
}

impl Drop for ComposeGuard<'_> {
    fn drop(&mut self) {
        COMPOSER.with(|c| {
            std::mem::swap(&mut *c.borrow_mut(), &mut *self.slots.borrow_mut());
        });
    }
}

/// One mounted component instance.
///
/// The first [`Composition::compose`] mounts it; [`Composition::dispose`] (or
/// dropping the last handle) tears it down, running every cleanup registered
/// through `scoped_effect`/`disposable_effect` while it was composed.
/// Signals read during compose mark it dirty when they change.
#[derive(Clone)]
pub struct Composition {
    inner: Rc<CompositionInner>,
}

struct CompositionInner {
    scope: RefCell<Option<Scope>>,
    slots: RefCell<Composer>,
    observer: ObserverId,
    dirty: Rc<Cell<bool>>,
    frames: Cell<u64>,
}

impl Default for Composition {
    fn default() -> Self {
        Self::new()
    }
}

impl Composition {
    pub fn new() -> Self {
        let dirty = Rc::new(Cell::new(true));
        let observer = reactive::new_observer({
            let dirty = dirty.clone();
            move || dirty.set(true)
        });
        Self {
            inner: Rc::new(CompositionInner {
                scope: RefCell::new(Some(Scope::new())),
                slots: RefCell::new(Composer::default()),
                observer,
                dirty,
                frames: Cell::new(0),
            }),
        }
    }

    /// Runs `content` against this instance's slots and scope.
    pub fn compose(&self, content: impl FnOnce() -> View) -> Result<View, RuntimeError> {
        let scope = self
            .inner
            .scope
            .borrow()
            .clone()
            .ok_or(RuntimeError::Disposed)?;

        let view = {
            let _guard = ComposeGuard::begin(&self.inner.slots);
            self.inner.dirty.set(false);
            scope.run(|| reactive::track(self.inner.observer, content))
        };
        self.inner.frames.set(self.inner.frames.get() + 1);
        Ok(view)
    }

    /// True before the first compose and after any tracked signal changed.
    pub fn needs_recompose(&self) -> bool {
        !self.is_disposed() && self.inner.dirty.get()
    }

    /// Number of completed compose passes.
    pub fn frame(&self) -> u64 {
        self.inner.frames.get()
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.scope.borrow().is_none()
    }

    /// Tears the instance down. Idempotent.
    pub fn dispose(&self) {
        self.inner.teardown();
    }
}

impl CompositionInner {
    fn teardown(&self) {
        let Some(scope) = self.scope.borrow_mut().take() else {
            return;
        };
        log::debug!("disposing composition after {} frame(s)", self.frames.get());
        reactive::remove_observer(self.observer);
        scope.dispose();
        // Remembered state goes last so cleanups can still reach it.
        let slots = std::mem::take(&mut *self.slots.borrow_mut());
        drop(slots);
    }
}

impl Drop for CompositionInner {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Slot-based remember (sequential composition only)
pub fn remember<T: 'static>(init: impl FnOnce() -> T) -> Rc<T> {
    COMPOSER.with(|c| {
        let mut c = c.borrow_mut();
        let cursor = c.cursor;
        c.cursor += 1;

        if cursor >= c.slots.len() {
            let rc: Rc<T> = Rc::new(init());
            c.slots.push(Box::new(rc.clone()));
            return rc;
        }

        if let Some(rc) = c.slots[cursor].downcast_ref::<Rc<T>>() {
            rc.clone()
        } else {
            log::warn!(
                "remember: slot {} type changed; replacing. \
                 If this is due to conditional composition, prefer remember_with_key.",
                cursor
            );
            let rc: Rc<T> = Rc::new(init());
            c.slots[cursor] = Box::new(rc.clone());
            rc
        }
    })
}

/// Key-based remember
pub fn remember_with_key<T: 'static>(key: impl Into<String>, init: impl FnOnce() -> T) -> Rc<T> {
    COMPOSER.with(|c| {
        let mut c = c.borrow_mut();
        let key = key.into();

        if let Some(existing) = c.keyed_slots.get(&key) {
            if let Some(rc) = existing.downcast_ref::<Rc<T>>() {
                return rc.clone();
            }
            log::warn!(
                "remember_with_key: key '{}' reused with a different type; replacing.",
                key
            );
        }

        let rc: Rc<T> = Rc::new(init());
        c.keyed_slots.insert(key, Box::new(rc.clone()));
        rc
    })
}

pub fn remember_state<T: 'static>(init: impl FnOnce() -> T) -> Rc<RefCell<T>> {
    remember(|| RefCell::new(init()))
}

pub fn remember_state_with_key<T: 'static>(
    key: impl Into<String>,
    init: impl FnOnce() -> T,
) -> Rc<RefCell<T>> {
    remember_with_key(key, || RefCell::new(init()))
}
