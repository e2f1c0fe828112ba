#![forbid(unsafe_code)]

//! Template compiler: turns interpolation markers and directive attributes
//! into live bindings against a [`ViewModel`].
//!
//! The pass is single and depth-first. The root's children are moved into a
//! detached fragment, processed there, and appended back to the root once
//! every binding exists.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tether_core::event::INPUT;
use tether_core::{Node, NodeType};

use crate::directive::{Directive, MODEL_DIRECTIVE};
use crate::error::Result;
use crate::interpolation::Interpolation;
use crate::reactive::Watcher;
use crate::value::Value;
use crate::view_model::ViewModel;

/// One compiled template construct.
#[derive(Clone)]
pub enum Binding {
    /// `{{ key }}` inside a text node.
    Text {
        node: Node,
        key: String,
        watcher: Rc<Watcher>,
    },
    /// `v-on:<event>` / `@<event>` bound to a method.
    Event {
        node: Node,
        event: String,
        method: String,
    },
    /// Two-way binding between an element's value and a data key.
    Model {
        node: Node,
        key: String,
        watcher: Rc<Watcher>,
    },
}

impl Binding {
    #[must_use]
    pub fn node(&self) -> &Node {
        match self {
            Binding::Text { node, .. } | Binding::Event { node, .. } | Binding::Model { node, .. } => {
                node
            }
        }
    }

    /// `"text"`, `"event"`, or `"model"`.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Binding::Text { .. } => "text",
            Binding::Event { .. } => "event",
            Binding::Model { .. } => "model",
        }
    }

    /// The data key (text/model) or method name (event) this binding targets.
    #[must_use]
    pub fn target(&self) -> &str {
        match self {
            Binding::Text { key, .. } | Binding::Model { key, .. } => key,
            Binding::Event { method, .. } => method,
        }
    }

    #[must_use]
    pub fn watcher(&self) -> Option<&Rc<Watcher>> {
        match self {
            Binding::Text { watcher, .. } | Binding::Model { watcher, .. } => Some(watcher),
            Binding::Event { .. } => None,
        }
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Binding");
        s.field("kind", &self.kind()).field("target", &self.target());
        if let Binding::Event { event, .. } = self {
            s.field("event", event);
        }
        s.field("node", &self.node().tag_name()).finish()
    }
}

/// Compile every node below `root` against `vm`.
pub fn compile(root: &Node, vm: &ViewModel) -> Result<Vec<Binding>> {
    let fragment = Node::fragment();
    for child in root.children() {
        fragment.append_child(&child)?;
    }

    let mut bindings = Vec::new();
    for child in fragment.children() {
        compile_node(&child, vm, &mut bindings)?;
    }
    root.append_child(&fragment)?;

    tracing::debug!(
        message = "compile.done",
        bindings = bindings.len(),
        text = bindings.iter().filter(|b| matches!(b, Binding::Text { .. })).count(),
        event = bindings.iter().filter(|b| matches!(b, Binding::Event { .. })).count(),
        model = bindings.iter().filter(|b| matches!(b, Binding::Model { .. })).count(),
    );
    Ok(bindings)
}

fn compile_node(node: &Node, vm: &ViewModel, bindings: &mut Vec<Binding>) -> Result<()> {
    match node.node_type() {
        NodeType::Element => compile_element(node, vm, bindings),
        NodeType::Text => compile_text(node, vm, bindings),
        NodeType::Fragment => {}
    }
    for child in node.children() {
        compile_node(&child, vm, bindings)?;
    }
    Ok(())
}

fn compile_text(node: &Node, vm: &ViewModel, bindings: &mut Vec<Binding>) {
    let Some(interp) = Interpolation::parse(&node.text_content()) else {
        return;
    };
    let key = interp.key().to_string();
    let interp = Rc::new(interp);

    let watcher = {
        let target = node.clone();
        let interp = Rc::clone(&interp);
        Watcher::new(vm.context(), vm.data(), key.clone(), move |new, _old| {
            target.set_text_content(&interp.render(new));
            Ok(())
        })
    };
    node.set_text_content(&interp.render(&watcher.value()));

    bindings.push(Binding::Text {
        node: node.clone(),
        key,
        watcher,
    });
}

fn compile_element(node: &Node, vm: &ViewModel, bindings: &mut Vec<Binding>) {
    for attr in node.attributes() {
        let Some(directive) = Directive::parse(&attr.name) else {
            continue;
        };
        match directive {
            Directive::Event { event } => bind_event(node, vm, &event, attr.value.trim(), bindings),
            Directive::Model { name } => {
                if name != MODEL_DIRECTIVE {
                    tracing::debug!(
                        message = "compile.implicit_model",
                        directive = %attr.name,
                        key = attr.value.trim()
                    );
                }
                bind_model(node, vm, attr.value.trim(), bindings);
            }
        }
        node.remove_attribute(&attr.name);
    }
}

fn bind_event(node: &Node, vm: &ViewModel, event: &str, method_name: &str, bindings: &mut Vec<Binding>) {
    if event.is_empty() {
        return;
    }
    let Some(method) = vm.methods().get(method_name) else {
        return;
    };
    let vm = vm.downgrade();
    node.add_event_listener(event, move |e| {
        let Some(vm) = vm.upgrade() else {
            return Ok(());
        };
        method(&vm, e).map_err(Into::into)
    });
    bindings.push(Binding::Event {
        node: node.clone(),
        event: event.to_string(),
        method: method_name.to_string(),
    });
}

fn bind_model(node: &Node, vm: &ViewModel, key: &str, bindings: &mut Vec<Binding>) {
    // Last value known to be in sync between the element and the data.
    let last = Rc::new(RefCell::new(Value::Undefined));

    let watcher = {
        let target = node.clone();
        let last = Rc::clone(&last);
        Watcher::new(vm.context(), vm.data(), key, move |new, _old| {
            target.set_value(&new.to_render_string());
            *last.borrow_mut() = new.clone();
            Ok(())
        })
    };
    let initial = watcher.value();
    node.set_value(&initial.to_render_string());
    *last.borrow_mut() = initial;

    let data = vm.data().downgrade();
    let listener_key = key.to_string();
    node.add_event_listener(INPUT, move |e| {
        let Some(data) = data.upgrade() else {
            return Ok(());
        };
        let value = Value::from(e.target().value());
        if last.borrow().strict_eq(&value) {
            return Ok(());
        }
        *last.borrow_mut() = value.clone();
        data.set(&listener_key, value).map_err(Into::into)
    });

    bindings.push(Binding::Model {
        node: node.clone(),
        key: key.to_string(),
        watcher,
    });
}
