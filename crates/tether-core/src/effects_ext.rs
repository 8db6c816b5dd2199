use crate::{Dispose, on_unmount, remember, scoped_effect};
use std::cell::RefCell;

/// Runs `effect` on first composition and whenever `key` changes. The
/// previous cleanup runs before the next effect, and the last one runs when
/// the owning scope is disposed.
///
/// Slot-based like `remember`: the Nth call in a composition always maps to
/// the Nth stored key/cleanup pair.
pub fn disposable_effect<K: PartialEq + Clone + 'static>(
    key: K,
    effect: impl FnOnce() -> Dispose + 'static,
) {
    let last_key = remember(|| RefCell::new(None::<K>));
    let cleanup_slot = remember(|| RefCell::new(None::<Dispose>));
    let installed = remember(|| RefCell::new(false));

    // Install a single unmount disposer for this callsite.
    if !*installed.borrow() {
        *installed.borrow_mut() = true;
        let cleanup_slot = cleanup_slot.clone();
        scoped_effect(move || {
            on_unmount(move || {
                let d = cleanup_slot.borrow_mut().take();
                if let Some(d) = d {
                    d.run();
                }
            })
        });
    }

    // Key change: cleanup previous + run new effect
    let changed = last_key.borrow().as_ref() != Some(&key);
    if changed {
        *last_key.borrow_mut() = Some(key);

        let previous = cleanup_slot.borrow_mut().take();
        if let Some(d) = previous {
            d.run();
        }

        let d = effect();
        *cleanup_slot.borrow_mut() = Some(d);
    }
}
