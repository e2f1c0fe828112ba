#![forbid(unsafe_code)]

//! Tether public facade crate.
//!
//! This crate provides the stable, ergonomic surface area for users.

pub use tether_core::{Document, DomError, Event, Node};
pub use tether_runtime::{Error, Options, ReactiveObject, Result, Value, ViewModel};

pub mod prelude {
    pub use tether_core as core;
    pub use tether_runtime as runtime;

    pub use tether_core::{Document, Event, Node};
    pub use tether_runtime::{Options, ReactiveObject, Value, ViewModel};
}
