#![forbid(unsafe_code)]

//! View model: data, methods, and a compiled template root wired together.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use ahash::AHashMap;
use tether_core::{Document, Event, Node};

use crate::compile::{Binding, compile};
use crate::error::{Error, Result};
use crate::reactive::{EvalContext, ReactiveObject, Watcher, observe_object};
use crate::value::Value;

/// A method callable from event directives. Receives the view model as its
/// receiver and the triggering event.
pub type Method = Rc<dyn Fn(&ViewModel, &Event) -> Result<()>>;

/// Post-mount hook.
pub type MountedHook = Box<dyn FnOnce(&ViewModel) -> Result<()>>;

/// Named methods of a view model.
#[derive(Clone, Default)]
pub struct Methods {
    table: AHashMap<String, Method>,
}

impl Methods {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a method.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        method: impl Fn(&ViewModel, &Event) -> Result<()> + 'static,
    ) {
        self.table.insert(name.into(), Rc::new(method));
    }

    /// Handle to the method registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Method> {
        self.table.get(name).cloned()
    }

    /// Whether a method named `name` exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    /// Number of registered methods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether no method is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Method names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.table.keys().cloned().collect();
        names.sort();
        names
    }
}

impl fmt::Debug for Methods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

/// Construction options for [`ViewModel::mount`].
///
/// # Example
///
/// ```
/// use tether_runtime::{Options, ReactiveObject, ViewModel};
/// use tether_core::Document;
///
/// let doc = Document::parse(r#"<div id="app">{{ msg }}</div>"#).unwrap();
/// let data: ReactiveObject = [("msg", "hi")].into_iter().collect();
/// let vm = ViewModel::mount(Options::new().el("#app").data(data), &doc).unwrap();
/// assert_eq!(doc.to_html(), r#"<div id="app">hi</div>"#);
/// vm.set("msg", "bye").unwrap();
/// assert_eq!(doc.to_html(), r#"<div id="app">bye</div>"#);
/// ```
#[derive(Default)]
pub struct Options {
    el: Option<String>,
    data: ReactiveObject,
    methods: Methods,
    mounted: Option<MountedHook>,
}

impl Options {
    /// No root, empty data, no methods, no hook.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selector of the template root.
    #[must_use]
    pub fn el(mut self, selector: impl Into<String>) -> Self {
        self.el = Some(selector.into());
        self
    }

    /// The data object; its keys at mount time become the proxied keys.
    #[must_use]
    pub fn data(mut self, data: ReactiveObject) -> Self {
        self.data = data;
        self
    }

    /// Register one method.
    #[must_use]
    pub fn method(
        mut self,
        name: impl Into<String>,
        method: impl Fn(&ViewModel, &Event) -> Result<()> + 'static,
    ) -> Self {
        self.methods.insert(name, method);
        self
    }

    /// Replace the whole methods table.
    #[must_use]
    pub fn methods(mut self, methods: Methods) -> Self {
        self.methods = methods;
        self
    }

    /// Hook run once, after compilation.
    #[must_use]
    pub fn mounted(mut self, hook: impl FnOnce(&ViewModel) -> Result<()> + 'static) -> Self {
        self.mounted = Some(Box::new(hook));
        self
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("el", &self.el)
            .field("data", &self.data)
            .field("methods", &self.methods)
            .field("mounted", &self.mounted.is_some())
            .finish()
    }
}

struct VmInner {
    data: ReactiveObject,
    methods: Methods,
    proxied: Vec<String>,
    cx: EvalContext,
    root: RefCell<Option<Node>>,
    bindings: RefCell<Vec<Binding>>,
}

/// Shared handle to a mounted view model.
#[derive(Clone)]
pub struct ViewModel {
    inner: Rc<VmInner>,
}

/// Non-owning handle held by event listeners.
#[derive(Clone)]
pub struct WeakViewModel {
    inner: Weak<VmInner>,
}

impl WeakViewModel {
    /// The view model, if a strong handle is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<ViewModel> {
        self.inner.upgrade().map(|inner| ViewModel { inner })
    }
}

impl ViewModel {
    /// Instrument the data, compile the template root selected by `el`
    /// inside `document`, then run the `mounted` hook.
    ///
    /// A selector that matches nothing (or no `el` at all) is not an error:
    /// compilation is skipped with a warning and the data stays reactive.
    ///
    /// # Errors
    ///
    /// Fails on a malformed selector, on a compile-time tree error, or when
    /// the `mounted` hook fails.
    pub fn mount(options: Options, document: &Document) -> Result<Self> {
        Self::mount_at(options, document.root())
    }

    /// Like [`mount`](Self::mount), resolving `el` below an arbitrary node.
    pub fn mount_at(options: Options, scope: &Node) -> Result<Self> {
        let Options {
            el,
            data,
            methods,
            mounted,
        } = options;

        let cx = EvalContext::new();
        let proxied = data.keys();
        observe_object(&data, &cx);

        let vm = ViewModel {
            inner: Rc::new(VmInner {
                data,
                methods,
                proxied,
                cx,
                root: RefCell::new(None),
                bindings: RefCell::new(Vec::new()),
            }),
        };

        let root = match el.as_deref() {
            Some(selector) => scope.query_selector(selector)?,
            None => None,
        };
        match root {
            Some(root) => {
                let bindings = compile(&root, &vm)?;
                *vm.inner.bindings.borrow_mut() = bindings;
                *vm.inner.root.borrow_mut() = Some(root);
            }
            None => {
                tracing::warn!(
                    message = "view_model.root_missing",
                    el = el.as_deref().unwrap_or("")
                );
            }
        }

        if let Some(hook) = mounted {
            hook(&vm)?;
        }
        Ok(vm)
    }

    /// Tracked read of a proxied data key; `Undefined` for anything else.
    #[must_use]
    pub fn get(&self, key: &str) -> Value {
        if self.is_proxied(key) {
            self.inner.data.get(key)
        } else {
            Value::Undefined
        }
    }

    /// Write a proxied data key, notifying its subscribers.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownProperty`] if `key` was not a data key at mount time,
    /// or the first subscriber error of the notify pass.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        if !self.is_proxied(key) {
            return Err(Error::UnknownProperty {
                key: key.to_string(),
            });
        }
        self.inner.data.set(key, value)
    }

    /// Call a method by name with this view model as receiver.
    pub fn call(&self, name: &str, event: &Event) -> Result<()> {
        let method = self
            .inner
            .methods
            .get(name)
            .ok_or_else(|| Error::UnknownMethod {
                name: name.to_string(),
            })?;
        method(self, event)
    }

    /// Watch a data key in this view model's context.
    ///
    /// The callback receives `(vm, new, old)` on every strict change.
    pub fn watch(
        &self,
        key: &str,
        callback: impl Fn(&ViewModel, &Value, &Value) -> Result<()> + 'static,
    ) -> Rc<Watcher> {
        let vm = self.downgrade();
        Watcher::new(&self.inner.cx, &self.inner.data, key, move |new, old| {
            match vm.upgrade() {
                Some(vm) => callback(&vm, new, old),
                None => Ok(()),
            }
        })
    }

    /// The instrumented data object.
    #[must_use]
    pub fn data(&self) -> &ReactiveObject {
        &self.inner.data
    }

    /// The methods table.
    #[must_use]
    pub fn methods(&self) -> &Methods {
        &self.inner.methods
    }

    /// The evaluation context the data was instrumented with.
    #[must_use]
    pub fn context(&self) -> &EvalContext {
        &self.inner.cx
    }

    /// The compiled template root, if `el` resolved.
    #[must_use]
    pub fn root(&self) -> Option<Node> {
        self.inner.root.borrow().clone()
    }

    /// Bindings created by compilation, in document order.
    #[must_use]
    pub fn bindings(&self) -> Vec<Binding> {
        self.inner.bindings.borrow().clone()
    }

    /// Whether `el` resolved and the template was compiled.
    #[must_use]
    pub fn is_compiled(&self) -> bool {
        self.inner.root.borrow().is_some()
    }

    /// Data keys present at mount time, in insertion order.
    #[must_use]
    pub fn proxied_keys(&self) -> &[String] {
        &self.inner.proxied
    }

    /// Whether `key` can be read and written through the view model.
    #[must_use]
    pub fn is_proxied(&self, key: &str) -> bool {
        self.inner.proxied.iter().any(|k| k == key)
    }

    /// Non-owning handle, as held by event listeners.
    #[must_use]
    pub fn downgrade(&self) -> WeakViewModel {
        WeakViewModel {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Whether both handles refer to the same view model.
    #[must_use]
    pub fn ptr_eq(&self, other: &ViewModel) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for ViewModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewModel")
            .field("data", &self.inner.data)
            .field("methods", &self.inner.methods)
            .field("compiled", &self.is_compiled())
            .field("bindings", &self.inner.bindings.borrow().len())
            .finish()
    }
}
