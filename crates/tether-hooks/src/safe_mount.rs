//! Async mount guard.
//!
//! Starts an async operation when a component mounts, keeps its result only if
//! the component is still mounted when it resolves, and gates dependent UI on
//! that result.

use std::convert::Infallible;
use std::fmt;
use std::future::Future;

use tether_core::{
    Dispose, RuntimeError, Signal, SubId, View, disposable_effect, has_executor, on_unmount,
    reactive, remember, signal, spawn_local,
};

use crate::error::MountError;
use crate::gate::{Children, SafeRender};
use crate::liveness::{IsActive, Liveness};
use crate::options::SafeMountOptions;

/// Teardown callback. Receives the resolved value, or `None` when the
/// operation had not resolved (or was rejected) before teardown.
pub type Cleanup<T> = Box<dyn FnOnce(Option<T>)>;

/// Snapshot of a mount's deferred result.
#[derive(Clone, Debug, PartialEq)]
pub enum MountState<T, E: fmt::Display> {
    Pending,
    Resolved(T),
    Failed(MountError<E>),
}

/// Handle returned by the `use_safe_async_mount*` hooks. Every recomposition
/// of the same instance returns a handle to the same state.
pub struct SafeMount<T: 'static, E: fmt::Display + 'static = Infallible> {
    label: std::borrow::Cow<'static, str>,
    liveness: Liveness,
    value: Signal<Option<T>>,
    error: Signal<Option<MountError<E>>>,
    open: Signal<bool>,
}

impl<T: 'static, E: fmt::Display + 'static> Clone for SafeMount<T, E> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            liveness: self.liveness.clone(),
            value: self.value.clone(),
            error: self.error.clone(),
            open: self.open.clone(),
        }
    }
}

impl<T: 'static, E: fmt::Display + 'static> SafeMount<T, E> {
    fn new(label: std::borrow::Cow<'static, str>) -> Self {
        Self {
            label,
            liveness: Liveness::new(),
            value: signal(None),
            error: signal(None),
            open: signal(false),
        }
    }

    /// Whether the owning component is currently mounted.
    pub fn is_mounted(&self) -> bool {
        self.liveness.is_alive()
    }

    /// Whether the gate is open: the operation resolved while mounted and no
    /// teardown happened since.
    pub fn is_safe_mounted(&self) -> bool {
        self.open.get()
    }

    pub fn liveness(&self) -> Liveness {
        self.liveness.clone()
    }

    pub fn gate(&self) -> SafeRender<T> {
        SafeRender::new(self.open.clone(), self.value.clone())
    }

    /// Shorthand for `gate().render(children)`.
    pub fn render(&self, children: impl Into<Children<T>>) -> View {
        self.gate().render(children)
    }

    pub fn with_value<R>(&self, f: impl FnOnce(Option<&T>) -> R) -> R {
        self.value.with(|v| f(v.as_ref()))
    }

    /// Calls `f` with the resolved value each time the gate opens.
    pub fn on_gate_activated(&self, f: impl Fn(&T) + 'static) -> SubId {
        let value = self.value.clone();
        self.open.subscribe(move |open| {
            if *open {
                value.with(|v| {
                    if let Some(v) = v {
                        f(v)
                    }
                });
            }
        })
    }

    /// Calls `f` whenever the stored value is set or cleared.
    pub fn on_value_changed(&self, f: impl Fn(Option<&T>) + 'static) -> SubId {
        self.value.subscribe(move |v| f(v.as_ref()))
    }

    pub fn unsubscribe_gate(&self, id: SubId) -> bool {
        self.open.unsubscribe(id)
    }

    pub fn unsubscribe_value(&self, id: SubId) -> bool {
        self.value.unsubscribe(id)
    }

    fn mount<F, Fut>(
        &self,
        operation: F,
        cleanup: Option<Cleanup<T>>,
        retain: Option<fn(&T) -> T>,
    ) -> Dispose
    where
        F: FnOnce(IsActive) -> Fut,
        Fut: Future<Output = Result<T, E>> + 'static,
    {
        let this = self.clone();
        let unmount = on_unmount(move || this.teardown(cleanup, retain));

        if !has_executor() {
            log::error!("{}: no executor entered; operation not started", self.label);
            self.error
                .set(Some(MountError::Spawn(RuntimeError::NoExecutor.to_string())));
            return unmount;
        }

        self.liveness.set(true);
        log::debug!("{}: mounted, starting operation", self.label);

        let fut = reactive::untracked(|| operation(self.liveness.checker()));
        let task = {
            let this = self.clone();
            async move {
                let outcome = fut.await;
                this.resolve(outcome);
            }
        };
        if let Err(e) = spawn_local(task) {
            log::error!("{}: could not start operation: {e}", self.label);
            self.liveness.set(false);
            self.error.set(Some(MountError::Spawn(e.to_string())));
        }

        unmount
    }

    fn resolve(&self, outcome: Result<T, E>) {
        if !self.liveness.is_alive() {
            log::debug!("{}: resolved after teardown; discarding result", self.label);
            return;
        }
        match outcome {
            Ok(v) => {
                self.value.set(Some(v));
                // A value subscriber may have torn the mount down.
                if !self.liveness.is_alive() {
                    return;
                }
                self.open.set(true);
                log::debug!("{}: resolved, gate open", self.label);
            }
            Err(e) => {
                log::warn!("{}: operation rejected: {e}", self.label);
                self.error.set(Some(MountError::Rejected(e)));
            }
        }
    }

    fn teardown(&self, cleanup: Option<Cleanup<T>>, retain: Option<fn(&T) -> T>) {
        self.liveness.set(false);
        if self.open.with(|open| *open) {
            self.open.set(false);
        }

        let label = self.label.clone();
        let finish = move |last: Option<T>| {
            log::debug!(
                "{label}: torn down ({})",
                if last.is_some() { "resolved" } else { "unresolved" }
            );
            if let Some(cleanup) = cleanup {
                cleanup(last);
            }
        };

        if !self.value.with(Option::is_some) {
            finish(None);
        } else if let Some(retain) = retain {
            finish(self.value.with(|v| v.as_ref().map(retain)));
        } else {
            // Deferred until the current round ends when a value subscriber
            // is the one tearing down.
            self.value.replace_then(None, finish);
        }
    }
}

impl<T: Clone + 'static, E: fmt::Display + 'static> SafeMount<T, E> {
    /// The deferred result, once it resolved while mounted.
    pub fn value(&self) -> Option<T> {
        self.value.get()
    }
}

impl<T: 'static, E: fmt::Display + Clone + 'static> SafeMount<T, E> {
    pub fn error(&self) -> Option<MountError<E>> {
        self.error.get()
    }
}

impl<T: Clone + 'static, E: fmt::Display + Clone + 'static> SafeMount<T, E> {
    pub fn state(&self) -> MountState<T, E> {
        if let Some(v) = self.value.get() {
            MountState::Resolved(v)
        } else if let Some(e) = self.error.get() {
            MountState::Failed(e)
        } else {
            MountState::Pending
        }
    }
}

/// Guards an infallible async operation. See [`use_safe_async_mount_with`].
pub fn use_safe_async_mount<T, F, Fut>(operation: F, cleanup: Option<Cleanup<T>>) -> SafeMount<T>
where
    T: 'static,
    F: FnOnce(IsActive) -> Fut + 'static,
    Fut: Future<Output = T> + 'static,
{
    use_safe_async_mount_with(
        SafeMountOptions::default(),
        move |is_active| {
            let fut = operation(is_active);
            async move { Ok::<T, Infallible>(fut.await) }
        },
        cleanup,
    )
}

/// Guards a fallible async operation with default options.
pub fn try_use_safe_async_mount<T, E, F, Fut>(
    operation: F,
    cleanup: Option<Cleanup<T>>,
) -> SafeMount<T, E>
where
    T: 'static,
    E: fmt::Display + 'static,
    F: FnOnce(IsActive) -> Fut + 'static,
    Fut: Future<Output = Result<T, E>> + 'static,
{
    use_safe_async_mount_with(SafeMountOptions::default(), operation, cleanup)
}

/// Runs `operation` once when the calling component mounts.
///
/// - The operation receives an [`IsActive`] closure reporting whether the
///   component is still mounted; long operations should check it between
///   steps, nothing is aborted for them.
/// - If it resolves to `Ok` while mounted, the value is stored and the gate
///   opens. `Err` while mounted is kept as [`MountState::Failed`]. Anything
///   resolving after teardown is dropped.
/// - On teardown the mounted flag drops first, then `cleanup` runs with the
///   stored value (`None` if there was none). The value moves into the
///   cleanup, so the handle reads `None` afterwards.
///
/// Must be called while composing inside an entered executor. Without one
/// the operation is never called and the mount reports
/// [`MountError::Spawn`].
pub fn use_safe_async_mount_with<T, E, F, Fut>(
    options: SafeMountOptions,
    operation: F,
    cleanup: Option<Cleanup<T>>,
) -> SafeMount<T, E>
where
    T: 'static,
    E: fmt::Display + 'static,
    F: FnOnce(IsActive) -> Fut + 'static,
    Fut: Future<Output = Result<T, E>> + 'static,
{
    mount_hook(options, operation, cleanup, None)
}

/// Like [`use_safe_async_mount_with`], but the value stays readable through
/// the handle after teardown; `cleanup` receives a clone.
pub fn use_safe_async_mount_retained<T, E, F, Fut>(
    options: SafeMountOptions,
    operation: F,
    cleanup: Option<Cleanup<T>>,
) -> SafeMount<T, E>
where
    T: Clone + 'static,
    E: fmt::Display + 'static,
    F: FnOnce(IsActive) -> Fut + 'static,
    Fut: Future<Output = Result<T, E>> + 'static,
{
    mount_hook(options, operation, cleanup, Some(T::clone))
}

fn mount_hook<T, E, F, Fut>(
    options: SafeMountOptions,
    operation: F,
    cleanup: Option<Cleanup<T>>,
    retain: Option<fn(&T) -> T>,
) -> SafeMount<T, E>
where
    T: 'static,
    E: fmt::Display + 'static,
    F: FnOnce(IsActive) -> Fut + 'static,
    Fut: Future<Output = Result<T, E>> + 'static,
{
    let handle = remember(move || SafeMount::<T, E>::new(options.label));
    let mount = handle.as_ref().clone();
    disposable_effect((), move || mount.mount(operation, cleanup, retain));
    handle.as_ref().clone()
}
