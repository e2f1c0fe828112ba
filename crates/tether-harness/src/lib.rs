#![forbid(unsafe_code)]

//! Reference fixtures for Tether's end-to-end and property suites.
//!
//! - [`Fixture`]: a parsed document plus the view model mounted on it.
//! - [`UpdateCounter`]: a [`Subscriber`] that only counts notifications,
//!   used to observe notify passes on a property's `Dep`.
//! - [`capture_messages`]: run a closure under a tracing layer that records
//!   the `message` field of every event.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use tether_core::{Document, Node};
use tether_runtime::{Options, ReactiveObject, Result, Subscriber, Value, ViewModel};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

/// A document and the view model mounted on its `#app` element.
pub struct Fixture {
    pub doc: Document,
    pub vm: ViewModel,
}

impl Fixture {
    /// Parse `html` and mount `options` with `el("#app")` on it.
    pub fn mount(html: &str, options: Options) -> Result<Self> {
        let doc = Document::parse(html)?;
        let vm = ViewModel::mount(options.el("#app"), &doc)?;
        Ok(Self { doc, vm })
    }

    /// Mount with data only.
    pub fn with_data(html: &str, data: ReactiveObject) -> Result<Self> {
        Self::mount(html, Options::new().data(data))
    }

    /// First node matching `selector`, if any.
    #[must_use]
    pub fn select(&self, selector: &str) -> Option<Node> {
        self.doc.query_selector(selector).ok().flatten()
    }

    #[must_use]
    pub fn html(&self) -> String {
        self.doc.to_html()
    }
}

/// Build a data object from a JSON literal. Non-object JSON yields an empty
/// object.
#[must_use]
pub fn json_data(json: serde_json::Value) -> ReactiveObject {
    match Value::from(json) {
        Value::Object(obj) => obj,
        _ => ReactiveObject::new(),
    }
}

/// Counts `update` calls.
#[derive(Debug, Default)]
pub struct UpdateCounter {
    hits: Cell<usize>,
}

impl UpdateCounter {
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Register a fresh counter directly on the `Dep` of `obj[key]`.
    ///
    /// Returns `None` if the property is not instrumented.
    #[must_use]
    pub fn attach(obj: &ReactiveObject, key: &str) -> Option<Rc<Self>> {
        let dep = obj.dep(key)?;
        let counter = Self::new();
        dep.add_sub(Rc::clone(&counter) as Rc<dyn Subscriber>);
        Some(counter)
    }

    #[must_use]
    pub fn hits(&self) -> usize {
        self.hits.get()
    }
}

impl Subscriber for UpdateCounter {
    fn update(&self) -> Result<()> {
        self.hits.set(self.hits.get() + 1);
        Ok(())
    }
}

struct MessageCapture {
    messages: Arc<Mutex<Vec<String>>>,
}

impl<S: tracing::Subscriber> Layer<S> for MessageCapture {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        struct Msg {
            message: Option<String>,
        }
        impl tracing::field::Visit for Msg {
            fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
                if field.name() == "message" {
                    self.message = Some(value.to_string());
                }
            }

            fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
                if field.name() == "message" {
                    self.message = Some(format!("{value:?}").trim_matches('"').to_string());
                }
            }
        }
        let mut msg = Msg { message: None };
        event.record(&mut msg);
        if let Some(message) = msg.message {
            if let Ok(mut messages) = self.messages.lock() {
                messages.push(message);
            }
        }
    }
}

/// Run `f` with a thread-local subscriber that records event messages
/// (`"dep.notify"`, `"watcher.run"`, ...) in emission order.
pub fn capture_messages<R>(f: impl FnOnce() -> R) -> (R, Vec<String>) {
    let messages = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(MessageCapture {
        messages: Arc::clone(&messages),
    });
    let out = tracing::subscriber::with_default(subscriber, f);
    let messages = messages
        .lock()
        .map(|m| m.clone())
        .unwrap_or_default();
    (out, messages)
}

/// How many captured messages equal `name`.
#[must_use]
pub fn count_messages(messages: &[String], name: &str) -> usize {
    messages.iter().filter(|m| m.as_str() == name).count()
}
