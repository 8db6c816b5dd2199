use std::fmt;

use tether_core::{Empty, Fragment, Signal, View};

/// What a [`SafeRender`] shows once it opens.
pub enum Children<T> {
    Views(Vec<View>),
    /// Built from the resolved value.
    With(Box<dyn FnOnce(&T) -> View>),
}

impl<T> Children<T> {
    pub fn views(views: Vec<View>) -> Self {
        Children::Views(views)
    }

    pub fn with(f: impl FnOnce(&T) -> View + 'static) -> Self {
        Children::With(Box::new(f))
    }
}

impl<T> From<View> for Children<T> {
    fn from(v: View) -> Self {
        Children::Views(vec![v])
    }
}

impl<T> From<Vec<View>> for Children<T> {
    fn from(v: Vec<View>) -> Self {
        Children::Views(v)
    }
}

impl<T> fmt::Debug for Children<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Children::Views(v) => f.debug_tuple("Views").field(v).finish(),
            Children::With(_) => f.write_str("With(<fn>)"),
        }
    }
}

/// Render gate. Renders an empty view until the owning mount resolved while
/// alive, then wraps its children in a fragment.
pub struct SafeRender<T: 'static> {
    open: Signal<bool>,
    value: Signal<Option<T>>,
}

impl<T: 'static> Clone for SafeRender<T> {
    fn clone(&self) -> Self {
        Self {
            open: self.open.clone(),
            value: self.value.clone(),
        }
    }
}

impl<T: 'static> SafeRender<T> {
    pub(crate) fn new(open: Signal<bool>, value: Signal<Option<T>>) -> Self {
        Self { open, value }
    }

    pub fn is_open(&self) -> bool {
        self.open.get()
    }

    pub fn render(&self, children: impl Into<Children<T>>) -> View {
        if !self.open.get() {
            return Empty();
        }
        match children.into() {
            Children::Views(views) => Fragment(views),
            Children::With(f) => self.value.with(|v| match v {
                Some(v) => Fragment(vec![f(v)]),
                None => {
                    log::warn!("gate open without a stored value; rendering nothing");
                    Empty()
                }
            }),
        }
    }
}
