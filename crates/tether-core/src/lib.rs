#![forbid(unsafe_code)]

//! Core: the in-memory document model Tether binds against.
//!
//! - [`Node`]: shared handle to an element, text, or fragment node.
//! - [`Event`]: a dispatched event (type + target).
//! - [`Selector`]: the small `tag#id.class` selector subset.
//! - [`Document`]: HTML template reader and serializer.

pub mod document;
pub mod error;
pub mod event;
pub mod node;
pub mod selector;

pub use document::Document;
pub use error::{DomError, Result};
pub use event::{Event, Listener, ListenerResult};
pub use node::{Attribute, Node, NodeType};
pub use selector::Selector;
