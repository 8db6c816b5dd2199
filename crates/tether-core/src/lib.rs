//! # Compositions, Signals, and Effects
//!
//! Tether is a small Compose-style runtime. Components are plain functions
//! returning a [`View`]; the pieces they build on are:
//!
//! - `Composition` — one mounted component instance (slots + teardown scope).
//! - `remember*` — lifecycle‑aware storage bound to a composition.
//! - `Signal<T>` — observable, reactive value.
//! - `effect` / `scoped_effect` / `disposable_effect` — side‑effects with cleanup.
//! - `Executor` — single‑threaded task loop with clock-driven timers.
//!
//! ## Compositions
//!
//! ```rust
//! use tether_core::*;
//!
//! fn Greeting() -> View {
//!     let visits = remember_state(|| 0);
//!     *visits.borrow_mut() += 1;
//!     Text(format!("visit #{}", visits.borrow()))
//! }
//!
//! let host = Composition::new();
//! assert_eq!(host.compose(Greeting).unwrap().texts(), ["visit #1"]);
//! assert_eq!(host.compose(Greeting).unwrap().texts(), ["visit #2"]);
//! host.dispose();
//! ```
//!
//! `remember` and `remember_state` are order‑based: the Nth call in a
//! composition always refers to the Nth stored value. `remember_with_key`
//! and `remember_state_with_key` are key‑based and stable across conditional
//! branches.
//!
//! ## Signals
//!
//! ```rust
//! use tether_core::*;
//!
//! let count = signal(0);
//! count.set(1);
//! count.update(|v| *v += 1);
//! assert_eq!(count.get(), 2);
//! ```
//!
//! Reads made while a composition is composing are tracked: a later write
//! flips [`Composition::needs_recompose`].
//!
//! ## Effects and cleanup
//!
//! ```rust
//! use tether_core::*;
//!
//! fn Example() -> View {
//!     scoped_effect(|| {
//!         log::info!("Mounted Example");
//!         on_unmount(|| log::info!("Unmounted Example"))
//!     });
//!     Empty()
//! }
//! ```
//!
//! Cleanups registered while composing run when the composition is disposed.
//! For async work, spawn onto the current [`Executor`] with [`spawn_local`]
//! and have the task check a liveness flag before touching state; the
//! `tether-hooks` crate packages that pattern.

pub mod clock;
pub mod effects;
pub mod effects_ext;
pub mod error;
pub mod executor;
pub mod prelude;
pub mod reactive;
pub mod runtime;
pub mod scope;
pub mod signal;
pub mod tests;
pub mod view;

pub use clock::*;
pub use effects::*;
pub use effects_ext::*;
pub use error::*;
pub use executor::*;
pub use prelude::*;
pub use runtime::*;
pub use signal::*;
pub use view::*;
