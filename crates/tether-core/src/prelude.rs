pub use crate::clock::{Clock, ManualClock, SystemClock};
pub use crate::effects::{Dispose, effect, on_unmount};
pub use crate::effects_ext::disposable_effect;
pub use crate::error::RuntimeError;
pub use crate::executor::{Executor, Sleep, has_executor, sleep, spawn_local};
pub use crate::runtime::{
    Composition, remember, remember_state, remember_state_with_key, remember_with_key,
};
pub use crate::scope::{Scope, current_scope, scoped_effect};
pub use crate::signal::{Signal, SubId, signal};
pub use crate::view::{Column, Empty, Fragment, Row, Text, View, ViewId, ViewKind};
