#![forbid(unsafe_code)]

//! Runtime: reactivity plus the template compiler.
//!
//! # Role in Tether
//! `tether-runtime` turns a plain [`ReactiveObject`] into observed state and
//! binds a [`tether_core`] template to it. Reads register the subscriber
//! being evaluated, writes notify, and [`Watcher`]s push changes into the
//! view.
//!
//! # Primary responsibilities
//! - **Reactivity**: [`Dep`], [`Watcher`], [`EvalContext`], [`observe`].
//! - **Compilation**: `{{ key }}` interpolation and `v-on:` / `@` / `v-*`
//!   directives via [`compile()`].
//! - **ViewModel**: [`ViewModel::mount`] wires data, methods, and a template
//!   root together and runs the post-mount hook.
//!
//! # How it fits in the system
//! The runtime sits on top of `tether-core`'s document model. The `tether`
//! facade crate re-exports both; `tether-cli` drives them from JSON config.

pub mod compile;
pub mod directive;
pub mod error;
pub mod interpolation;
pub mod reactive;
pub mod value;
pub mod view_model;

pub use compile::{Binding, compile};
pub use directive::Directive;
pub use error::{Error, Result};
pub use interpolation::Interpolation;
pub use reactive::{
    Dep, EvalContext, EvalGuard, ReactiveObject, Subscriber, WatchCallback, Watcher, WeakObject,
    observe, observe_object,
};
pub use value::Value;
pub use view_model::{Method, Methods, MountedHook, Options, ViewModel, WeakViewModel};
