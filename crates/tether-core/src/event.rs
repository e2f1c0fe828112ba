#![forbid(unsafe_code)]

//! Event values and listener callbacks.

use std::fmt;
use std::rc::Rc;

use crate::node::Node;

/// Outcome of a single listener invocation.
///
/// A failing listener aborts the rest of the dispatch; the error is wrapped
/// into [`DomError::Listener`](crate::DomError::Listener).
pub type ListenerResult = std::result::Result<(), Box<dyn std::error::Error>>;

/// A registered event callback.
pub type Listener = Rc<dyn Fn(&Event) -> ListenerResult>;

/// Event type used by two-way bindings.
pub const INPUT: &str = "input";
/// Event type used by [`Node::click`].
pub const CLICK: &str = "click";

/// An event dispatched at a target node.
#[derive(Clone)]
pub struct Event {
    kind: String,
    target: Node,
}

impl Event {
    #[must_use]
    pub fn new(kind: impl Into<String>, target: &Node) -> Self {
        Self {
            kind: kind.into(),
            target: target.clone(),
        }
    }

    /// Event type, e.g. `"click"`.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The node the event was dispatched at.
    #[must_use]
    pub fn target(&self) -> &Node {
        &self.target
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("kind", &self.kind)
            .field("target", &self.target)
            .finish()
    }
}
