use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use slotmap::{SlotMap, new_key_type};

use crate::reactive::{self, SignalId};

new_key_type! {
    /// Handle returned by [`Signal::subscribe`].
    pub struct SubId;
}

type Subscriber<T> = Rc<dyn Fn(&T)>;
type Deferred<T> = Box<dyn FnOnce(&Signal<T>)>;

/// Observable value. Clones share the same cell.
///
/// Subscribers run synchronously after every write and receive the new
/// value. Writes made while the signal is busy (a subscriber writing to the
/// signal that is notifying it, or a [`Signal::with`] closure writing to the
/// signal it borrows) are queued and applied, each with its own round of
/// notifications, once the busy call returns. Subscribers added or removed
/// during a round take effect from the next one.
pub struct Signal<T: 'static> {
    id: SignalId,
    inner: Rc<Inner<T>>,
}

struct Inner<T: 'static> {
    value: RefCell<T>,
    subs: RefCell<SlotMap<SubId, Subscriber<T>>>,
    notifying: Cell<bool>,
    deferred: RefCell<VecDeque<Deferred<T>>>,
}

impl<T: 'static> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: self.inner.clone(),
        }
    }
}

impl<T: 'static> Signal<T> {
    pub fn new(value: T) -> Self {
        Self {
            id: reactive::next_signal_id(),
            inner: Rc::new(Inner {
                value: RefCell::new(value),
                subs: RefCell::new(SlotMap::with_key()),
                notifying: Cell::new(false),
                deferred: RefCell::new(VecDeque::new()),
            }),
        }
    }

    pub fn id(&self) -> SignalId {
        self.id
    }

    pub fn get(&self) -> T
    where
        T: Clone,
    {
        reactive::register_signal_read(self.id);
        self.inner.value.borrow().clone()
    }

    /// Borrows the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        reactive::register_signal_read(self.id);
        let out = f(&*self.inner.value.borrow());
        self.flush();
        out
    }

    pub fn set(&self, v: T) {
        if self.is_busy() {
            self.defer(move |s| s.set(v));
            return;
        }
        *self.inner.value.borrow_mut() = v;
        self.notify();
    }

    pub fn update(&self, f: impl FnOnce(&mut T) + 'static) {
        if self.is_busy() {
            self.defer(move |s| s.update(f));
            return;
        }
        f(&mut *self.inner.value.borrow_mut());
        self.notify();
    }

    /// Replaces the value, notifies, then hands the old value to `then`.
    pub fn replace_then(&self, v: T, then: impl FnOnce(T) + 'static) {
        if self.is_busy() {
            self.defer(move |s| s.replace_then(v, then));
            return;
        }
        let old = std::mem::replace(&mut *self.inner.value.borrow_mut(), v);
        self.notify();
        then(old);
    }

    pub fn subscribe(&self, f: impl Fn(&T) + 'static) -> SubId {
        self.inner.subs.borrow_mut().insert(Rc::new(f))
    }

    /// Returns false if `id` was not subscribed (or already removed).
    pub fn unsubscribe(&self, id: SubId) -> bool {
        self.inner.subs.borrow_mut().remove(id).is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subs.borrow().len()
    }

    /// Whether a round of notifications is running right now.
    pub fn is_notifying(&self) -> bool {
        self.inner.notifying.get()
    }

    fn is_busy(&self) -> bool {
        self.inner.notifying.get() || self.inner.value.try_borrow_mut().is_err()
    }

    fn defer(&self, op: impl FnOnce(&Signal<T>) + 'static) {
        self.inner.deferred.borrow_mut().push_back(Box::new(op));
    }

    fn notify(&self) {
        let subs: Vec<Subscriber<T>> = self.inner.subs.borrow().values().cloned().collect();
        self.inner.notifying.set(true);
        {
            let value = self.inner.value.borrow();
            for s in &subs {
                s(&*value);
            }
        }
        self.inner.notifying.set(false);
        reactive::signal_changed(self.id);
        self.flush();
    }

    fn flush(&self) {
        while !self.is_busy() {
            let next = self.inner.deferred.borrow_mut().pop_front();
            match next {
                Some(op) => op(self),
                None => break,
            }
        }
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("id", &self.id)
            .field("value", &self.inner.value.try_borrow().ok())
            .finish()
    }
}

pub fn signal<T: 'static>(t: T) -> Signal<T> {
    Signal::new(t)
}
