#![forbid(unsafe_code)]

//! Key watchers: re-read a property on notification and fire a callback
//! when its value strictly changed.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::context::EvalContext;
use super::dep::Subscriber;
use super::object::{ReactiveObject, WeakObject};
use crate::error::Result;
use crate::value::Value;

static NEXT_WATCHER_ID: AtomicU64 = AtomicU64::new(1);

/// Invoked with `(new, old)` after a strict change.
pub type WatchCallback = Rc<dyn Fn(&Value, &Value) -> Result<()>>;

/// A live binding between one property of a [`ReactiveObject`] and a
/// callback.
///
/// Watchers are always handled through `Rc` so they can register
/// themselves as a [`Subscriber`].
pub struct Watcher {
    /// Process-unique id, used in logs.
    id: u64,
    /// Property this watcher reads.
    key: String,
    /// Weak, so a watcher never keeps its data alive.
    target: WeakObject,
    /// Last value seen; compared strictly on each run.
    cached: RefCell<Value>,
    /// Called with `(new, old)` after a strict change.
    callback: WatchCallback,
}

impl Watcher {
    /// Create a watcher on `target[key]`.
    ///
    /// Reads the key once with the new watcher active in `cx`, so the watcher
    /// registers itself with that property's `Dep`, and caches the result.
    /// The callback is not invoked. Watching a missing or plain property is
    /// allowed; the watcher simply never fires.
    pub fn new(
        cx: &EvalContext,
        target: &ReactiveObject,
        key: impl Into<String>,
        callback: impl Fn(&Value, &Value) -> Result<()> + 'static,
    ) -> Rc<Self> {
        let watcher = Rc::new(Self {
            id: NEXT_WATCHER_ID.fetch_add(1, Ordering::Relaxed),
            key: key.into(),
            target: target.downgrade(),
            cached: RefCell::new(Value::Undefined),
            callback: Rc::new(callback),
        });
        let initial = {
            let _guard = cx.enter(Rc::clone(&watcher) as Rc<dyn Subscriber>);
            target.get(&watcher.key)
        };
        *watcher.cached.borrow_mut() = initial;
        watcher
    }

    /// Re-read the key and fire the callback if the value strictly changed.
    ///
    /// The read is untracked: a watcher registers exactly once, at
    /// construction. Does nothing once the target object has been dropped.
    pub fn run(&self) -> Result<()> {
        let Some(target) = self.target.upgrade() else {
            return Ok(());
        };
        let new = target.peek(&self.key);
        let old = {
            let mut cached = self.cached.borrow_mut();
            if cached.strict_eq(&new) {
                return Ok(());
            }
            std::mem::replace(&mut *cached, new.clone())
        };
        tracing::trace!(message = "watcher.run", watcher = self.id, key = %self.key);
        (self.callback)(&new, &old)
    }

    /// Process-unique id of this watcher.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The watched property key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The last value this watcher saw.
    #[must_use]
    pub fn value(&self) -> Value {
        self.cached.borrow().clone()
    }
}

impl Subscriber for Watcher {
    fn update(&self) -> Result<()> {
        self.run()
    }
}

impl fmt::Debug for Watcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watcher")
            .field("id", &self.id)
            .field("key", &self.key)
            .field("cached", &*self.cached.borrow())
            .finish()
    }
}
