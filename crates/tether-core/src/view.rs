#![allow(non_snake_case)]
//! View tree produced by composition. Layout and painting belong to the
//! host; this crate only builds and inspects the tree.

use std::fmt;

pub type ViewId = u64;

#[derive(Clone, PartialEq)]
pub enum ViewKind {
    /// Renders nothing.
    Empty,
    /// Groups children without adding a node of its own.
    Fragment,
    Text {
        text: String,
    },
    Box,
    Row,
    Column,
}

impl fmt::Debug for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewKind::Empty => write!(f, "Empty"),
            ViewKind::Fragment => write!(f, "Fragment"),
            ViewKind::Text { text } => f.debug_struct("Text").field("text", text).finish(),
            ViewKind::Box => write!(f, "Box"),
            ViewKind::Row => write!(f, "Row"),
            ViewKind::Column => write!(f, "Column"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct View {
    pub id: ViewId,
    pub kind: ViewKind,
    pub children: Vec<View>,
}

impl View {
    pub fn new(id: ViewId, kind: ViewKind) -> Self {
        View {
            id,
            kind,
            children: vec![],
        }
    }

    pub fn empty() -> Self {
        View::new(0, ViewKind::Empty)
    }

    pub fn with_children(mut self, kids: Vec<View>) -> Self {
        self.children = kids;
        self
    }

    pub fn child(mut self, kid: View) -> Self {
        self.children.push(kid);
        self
    }

    /// True when nothing in this subtree produces output.
    pub fn is_empty(&self) -> bool {
        match self.kind {
            ViewKind::Empty => true,
            ViewKind::Fragment => self.children.iter().all(View::is_empty),
            _ => false,
        }
    }

    /// Text content of the subtree in depth-first order.
    pub fn texts(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_texts(&mut out);
        out
    }

    fn collect_texts(&self, out: &mut Vec<String>) {
        if let ViewKind::Text { text } = &self.kind {
            out.push(text.clone());
        }
        for c in &self.children {
            c.collect_texts(out);
        }
    }
}

impl Default for View {
    fn default() -> Self {
        View::empty()
    }
}

pub fn Empty() -> View {
    View::empty()
}

pub fn Fragment(children: Vec<View>) -> View {
    View::new(0, ViewKind::Fragment).with_children(children)
}

pub fn Text(text: impl Into<String>) -> View {
    View::new(0, ViewKind::Text { text: text.into() })
}

pub fn Box(children: Vec<View>) -> View {
    View::new(0, ViewKind::Box).with_children(children)
}

pub fn Row(children: Vec<View>) -> View {
    View::new(0, ViewKind::Row).with_children(children)
}

pub fn Column(children: Vec<View>) -> View {
    View::new(0, ViewKind::Column).with_children(children)
}
