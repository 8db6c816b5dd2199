//! # Lifecycle hooks
//!
//! `use_safe_async_mount` runs an async initialization when a component
//! mounts and only lets dependent UI through once that work resolved while
//! the component was still mounted.
//!
//! ```rust
//! use std::time::Duration;
//! use tether_core::*;
//! use tether_hooks::*;
//!
//! #[derive(Clone)]
//! struct Profile {
//!     name: String,
//! }
//!
//! fn ProfileCard() -> View {
//!     let profile = use_safe_async_mount(
//!         |is_active| async move {
//!             sleep(Duration::from_millis(500)).await;
//!             if !is_active() {
//!                 log::debug!("unmounted while loading");
//!             }
//!             Profile { name: "Ada".into() }
//!         },
//!         Some(Box::new(|last: Option<Profile>| {
//!             log::info!("cleanup saw {:?}", last.map(|p| p.name));
//!         })),
//!     );
//!
//!     Column(vec![
//!         Text(if profile.is_safe_mounted() { "ready" } else { "loading" }),
//!         profile.render(Children::with(|p: &Profile| Text(p.name.clone()))),
//!     ])
//! }
//!
//! let rt = Executor::manual();
//! let host = Composition::new();
//!
//! let view = rt.enter(|| host.compose(ProfileCard)).unwrap();
//! assert_eq!(view.texts(), ["loading"]);
//!
//! rt.advance(Duration::from_millis(500)).unwrap();
//! assert!(host.needs_recompose());
//! let view = rt.enter(|| host.compose(ProfileCard)).unwrap();
//! assert_eq!(view.texts(), ["ready", "Ada"]);
//!
//! host.dispose();
//! ```
//!
//! The hook is slot-based like `remember`: call it unconditionally, in the
//! same order, on every composition of the component.

pub mod error;
pub mod gate;
pub mod liveness;
pub mod options;
pub mod safe_mount;

pub use error::MountError;
pub use gate::{Children, SafeRender};
pub use liveness::{IsActive, Liveness};
pub use options::SafeMountOptions;
pub use safe_mount::{
    Cleanup, MountState, SafeMount, try_use_safe_async_mount, use_safe_async_mount,
    use_safe_async_mount_retained, use_safe_async_mount_with,
};
