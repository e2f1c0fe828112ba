#![forbid(unsafe_code)]

//! Evaluation context: the "who is reading right now" slot.
//!
//! Instrumented reads consult the context their property was bound to
//! during instrumentation; if a subscriber is active there, the read
//! registers it. The slot follows a strict protocol:
//!
//! - set immediately before a guarded evaluation ([`EvalContext::enter`]),
//! - cleared immediately after (when the [`EvalGuard`] drops, also on
//!   unwind),
//! - never left set across turns.
//!
//! Nested evaluation inside one context is unsupported: the inner read would
//! be attributed to whichever subscriber holds the slot. Entering while the
//! slot is occupied logs a warning; the guard still restores the outer
//! subscriber on drop.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::dep::Subscriber;

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

fn next_context_id() -> u64 {
    NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed)
}

struct ContextInner {
    id: u64,
    active: RefCell<Option<Rc<dyn Subscriber>>>,
}

/// Shared handle to one evaluation context.
///
/// Cheaply cloneable; clones share the same slot.
#[derive(Clone)]
pub struct EvalContext {
    inner: Rc<ContextInner>,
}

impl Default for EvalContext {
    fn default() -> Self {
        Self::new()
    }
}

impl EvalContext {
    /// A context with a fresh id and no active subscriber.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ContextInner {
                id: next_context_id(),
                active: RefCell::new(None),
            }),
        }
    }

    /// Unique identifier for this context (for logging).
    #[must_use]
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Make `subscriber` the active one until the returned guard drops.
    #[must_use = "the subscriber is only active while the guard is alive"]
    pub fn enter(&self, subscriber: Rc<dyn Subscriber>) -> EvalGuard {
        let previous = self.inner.active.borrow_mut().replace(subscriber);
        if previous.is_some() {
            tracing::warn!(message = "eval.reentrant", cx_id = self.inner.id);
        }
        EvalGuard {
            cx: self.clone(),
            previous,
        }
    }

    /// The subscriber currently being evaluated, if any.
    #[must_use]
    pub fn active(&self) -> Option<Rc<dyn Subscriber>> {
        self.inner.active.borrow().clone()
    }

    /// Whether a subscriber is currently active.
    #[must_use]
    pub fn is_evaluating(&self) -> bool {
        self.inner.active.borrow().is_some()
    }

    /// Whether both handles share the same slot.
    #[must_use]
    pub fn ptr_eq(&self, other: &EvalContext) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for EvalContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvalContext")
            .field("id", &self.inner.id)
            .field("evaluating", &self.is_evaluating())
            .finish()
    }
}

/// Clears (or restores) the active slot when dropped.
pub struct EvalGuard {
    cx: EvalContext,
    previous: Option<Rc<dyn Subscriber>>,
}

impl Drop for EvalGuard {
    fn drop(&mut self) {
        *self.cx.inner.active.borrow_mut() = self.previous.take();
    }
}

impl fmt::Debug for EvalGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvalGuard")
            .field("cx_id", &self.cx.id())
            .finish()
    }
}
