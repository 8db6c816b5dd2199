//! Read tracking between signals and observers.
//!
//! A `Composition` registers itself as an observer and composes under
//! [`track`]; every `Signal::get` made while it runs records an edge. When
//! one of those signals is written, the observer callback fires and the
//! edges are dropped until the next tracked run re-establishes them.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

pub type SignalId = usize;
pub type ObserverId = usize;

thread_local! {
    static CURRENT_OBSERVER: Cell<Option<ObserverId>> = const { Cell::new(None) };
    static GRAPH: RefCell<DepGraph> = RefCell::new(DepGraph::default());
    static NEXT_SIGNAL: Cell<SignalId> = const { Cell::new(0) };
}

#[derive(Default)]
struct DepGraph {
    next_observer: ObserverId,
    // signal_id -> observers that depend on it
    edges: HashMap<SignalId, HashSet<ObserverId>>,
    // observer_id -> signals it depends on
    back: HashMap<ObserverId, HashSet<SignalId>>,
    observers: HashMap<ObserverId, Rc<dyn Fn()>>,
}

impl DepGraph {
    fn remove_all_edges_for(&mut self, obs: ObserverId) {
        if let Some(signals) = self.back.remove(&obs) {
            for s in signals {
                if let Some(set) = self.edges.get_mut(&s) {
                    set.remove(&obs);
                    if set.is_empty() {
                        self.edges.remove(&s);
                    }
                }
            }
        }
    }

    fn remove_observer(&mut self, obs: ObserverId) {
        self.observers.remove(&obs);
        self.remove_all_edges_for(obs);
    }
}

pub(crate) fn next_signal_id() -> SignalId {
    NEXT_SIGNAL.with(|n| {
        let id = n.get();
        n.set(id + 1);
        id
    })
}

pub fn register_signal_read(sig: SignalId) {
    if let Some(obs) = CURRENT_OBSERVER.with(Cell::get) {
        GRAPH.with(|g| {
            let mut g = g.borrow_mut();
            g.edges.entry(sig).or_default().insert(obs);
            g.back.entry(obs).or_default().insert(sig);
        });
    }
}

/// Notifies every observer that read `sig` since its last tracked run.
pub fn signal_changed(sig: SignalId) {
    let notify: Vec<Rc<dyn Fn()>> = GRAPH.with(|gcell| {
        let mut g = gcell.borrow_mut();
        let Some(observers) = g.edges.remove(&sig) else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity(observers.len());
        for obs in observers {
            g.remove_all_edges_for(obs);
            if let Some(f) = g.observers.get(&obs) {
                out.push(f.clone());
            }
        }
        out
    });
    for f in notify {
        f();
    }
}

pub fn new_observer(f: impl Fn() + 'static) -> ObserverId {
    GRAPH.with(|g| {
        let mut g = g.borrow_mut();
        let id = g.next_observer;
        g.next_observer += 1;
        g.observers.insert(id, Rc::new(f));
        id
    })
}

/// Remove an observer and all of its dependency edges.
pub fn remove_observer(id: ObserverId) {
    GRAPH.with(|g| g.borrow_mut().remove_observer(id));
}

/// Runs `f` with `obs` as the current observer, replacing its previous edges.
pub fn track<R>(obs: ObserverId, f: impl FnOnce() -> R) -> R {
    GRAPH.with(|g| g.borrow_mut().remove_all_edges_for(obs));
    let prev = CURRENT_OBSERVER.with(|co| co.replace(Some(obs)));
    let result = f();
    CURRENT_OBSERVER.with(|co| co.set(prev));
    result
}

/// Runs `f` without recording any signal reads.
pub fn untracked<R>(f: impl FnOnce() -> R) -> R {
    let prev = CURRENT_OBSERVER.with(|co| co.replace(None));
    let result = f();
    CURRENT_OBSERVER.with(|co| co.set(prev));
    result
}
