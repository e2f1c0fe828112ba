#![forbid(unsafe_code)]

//! Dependency tracking for Tether view models.
//!
//! - [`ReactiveObject`]: an ordered property map whose instrumented
//!   properties each own one [`Dep`].
//! - [`Dep`]: the ordered subscriber list of one property.
//! - [`Watcher`]: binds one property key to a callback and caches the last
//!   value it saw.
//! - [`EvalContext`]: the slot naming the subscriber currently being
//!   evaluated, which instrumented reads register with.
//! - [`observe`] / [`observe_object`]: instrument an object graph.
//!
//! # Architecture
//!
//! Everything is single-threaded shared state (`Rc<RefCell<..>>`), like
//! the rest of the runtime. A watcher is constructed by entering its
//! context, reading its key (the read registers the watcher with that
//! property's `Dep`), and leaving the context. A later write replaces the
//! value and notifies the `Dep`; each watcher then re-reads its key and
//! invokes its callback only if the value strictly changed.
//!
//! # Invariants
//!
//! 1. Each property owns exactly one `Dep` for its lifetime.
//! 2. Subscribers are notified in registration order; duplicates are kept
//!    and each fires.
//! 3. Writes to instrumented properties always notify; the equality
//!    short-circuit lives in the watcher.
//! 4. At most one subscriber is active per context, and the slot is cleared
//!    when evaluation ends, including on unwind.
//! 5. Properties created after instrumentation stay plain and untracked.
//!
//! # Failure Modes
//!
//! - A failing watcher callback stops the notification pass. The error is
//!   returned from the `set` that triggered it, after the new value has
//!   been stored; later subscribers in that pass do not run.
//! - Entering a context that already has an active subscriber logs
//!   `eval.reentrant` and shadows it until the inner guard drops.
//! - A watcher whose object has been dropped does nothing when notified.
//! - Reading or writing from inside a callback is allowed: borrows are
//!   released before any subscriber runs. A write to the key being
//!   notified recurses through `notify` again.

pub mod context;
pub mod dep;
pub mod object;
pub mod observer;
pub mod watcher;

pub use context::{EvalContext, EvalGuard};
pub use dep::{Dep, Subscriber};
pub use object::{ReactiveObject, WeakObject};
pub use observer::{observe, observe_object};
pub use watcher::{WatchCallback, Watcher};
