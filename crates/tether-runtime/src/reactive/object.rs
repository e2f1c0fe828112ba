#![forbid(unsafe_code)]

//! Ordered property map with per-property dependency tracking.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use ahash::AHashMap;

use super::context::EvalContext;
use super::dep::Dep;
use crate::error::Result;
use crate::value::Value;

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

struct Property {
    key: String,
    value: Value,
    /// Present once the property has been instrumented.
    tracking: Option<Tracking>,
}

struct Tracking {
    dep: Dep,
    cx: EvalContext,
}

struct ObjectInner {
    id: u64,
    /// Built from a sequence; keys are `"0"`, `"1"`, ... in order.
    list: bool,
    props: Vec<Property>,
    index: AHashMap<String, usize>,
}

impl ObjectInner {
    fn find(&self, key: &str) -> Option<&Property> {
        self.index.get(key).map(|&i| &self.props[i])
    }

    fn find_mut(&mut self, key: &str) -> Option<&mut Property> {
        match self.index.get(key) {
            Some(&i) => Some(&mut self.props[i]),
            None => None,
        }
    }
}

/// Shared, mutable, insertion-ordered map of [`Value`]s.
///
/// Cloning yields another handle to the same object; equality of handles is
/// identity ([`ptr_eq`](Self::ptr_eq)). An object built with
/// [`list`](Self::list) keeps index keys and remembers that it came from a
/// sequence, so it snapshots back to one.
#[derive(Clone)]
pub struct ReactiveObject {
    inner: Rc<RefCell<ObjectInner>>,
}

impl Default for ReactiveObject {
    fn default() -> Self {
        Self::new()
    }
}

impl ReactiveObject {
    /// An empty object with a fresh id.
    #[must_use]
    pub fn new() -> Self {
        Self::with_kind(false)
    }

    /// An object holding `items` under the keys `"0"`, `"1"`, ...
    #[must_use]
    pub fn list<V: Into<Value>>(items: impl IntoIterator<Item = V>) -> Self {
        let obj = Self::with_kind(true);
        for (i, item) in items.into_iter().enumerate() {
            obj.insert(&i.to_string(), item);
        }
        obj
    }

    fn with_kind(list: bool) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ObjectInner {
                id: NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed),
                list,
                props: Vec::new(),
                index: AHashMap::new(),
            })),
        }
    }

    /// Whether this object was built with [`list`](Self::list).
    #[must_use]
    pub fn is_list(&self) -> bool {
        self.inner.borrow().list
    }

    /// Process-unique identity, stable for the object's lifetime.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.inner.borrow().id
    }

    /// Read a property, registering the active subscriber of the property's
    /// context (if any) with its `Dep`. Missing keys read as `Undefined`.
    #[must_use]
    pub fn get(&self, key: &str) -> Value {
        let (value, registration) = {
            let inner = self.inner.borrow();
            match inner.find(key) {
                None => return Value::Undefined,
                Some(prop) => {
                    let registration = prop.tracking.as_ref().and_then(|t| {
                        t.cx.active().map(|sub| (t.dep.clone(), sub))
                    });
                    (prop.value.clone(), registration)
                }
            }
        };
        if let Some((dep, sub)) = registration {
            dep.add_sub(sub);
        }
        value
    }

    /// Read a property without dependency tracking.
    #[must_use]
    pub fn peek(&self, key: &str) -> Value {
        self.inner
            .borrow()
            .find(key)
            .map(|prop| prop.value.clone())
            .unwrap_or_default()
    }

    /// Write a property.
    ///
    /// Instrumented properties always notify their `Dep` after the value is
    /// replaced, even when the new value equals the old one. Writing a key
    /// that does not exist yet creates a plain, untracked property.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        if !self.contains_key(key) {
            self.insert(key, value);
            return Ok(());
        }
        let dep = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.id;
            let Some(prop) = inner.find_mut(key) else {
                return Ok(());
            };
            let dep = prop.tracking.as_ref().map(|t| t.dep.clone());
            if dep.is_some() {
                tracing::debug!(message = "reactive.set", object = id, key, value = %value);
            }
            prop.value = value;
            dep
        };
        match dep {
            Some(dep) => dep.notify(),
            None => Ok(()),
        }
    }

    /// Add a plain property if `key` is absent. Returns `false` and leaves
    /// the object untouched if the key already exists.
    pub fn insert(&self, key: &str, value: impl Into<Value>) -> bool {
        let mut inner = self.inner.borrow_mut();
        if inner.index.contains_key(key) {
            return false;
        }
        let at = inner.props.len();
        inner.props.push(Property {
            key: key.to_string(),
            value: value.into(),
            tracking: None,
        });
        inner.index.insert(key.to_string(), at);
        true
    }

    /// Keys in insertion order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.inner
            .borrow()
            .props
            .iter()
            .map(|prop| prop.key.clone())
            .collect()
    }

    /// Number of properties, plain and instrumented.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().props.len()
    }

    /// Whether the object has no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().props.is_empty()
    }

    /// Whether `key` exists, instrumented or not.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.borrow().index.contains_key(key)
    }

    /// Whether `key` exists and has been instrumented.
    #[must_use]
    pub fn is_reactive(&self, key: &str) -> bool {
        self.inner
            .borrow()
            .find(key)
            .is_some_and(|prop| prop.tracking.is_some())
    }

    /// Handle to the `Dep` of an instrumented property.
    #[must_use]
    pub fn dep(&self, key: &str) -> Option<Dep> {
        self.inner
            .borrow()
            .find(key)
            .and_then(|prop| prop.tracking.as_ref().map(|t| t.dep.clone()))
    }

    /// Number of subscribers registered on `key` (0 for plain or missing
    /// properties).
    #[must_use]
    pub fn subscriber_count(&self, key: &str) -> usize {
        self.dep(key).map_or(0, |dep| dep.len())
    }

    /// Whether both handles refer to the same object.
    #[must_use]
    pub fn ptr_eq(&self, other: &ReactiveObject) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Non-owning handle; bindings hold these so they never keep data alive.
    #[must_use]
    pub fn downgrade(&self) -> WeakObject {
        WeakObject {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Instrument an existing property. Returns `false` (and keeps the
    /// existing `Dep`) if the property is missing or already instrumented.
    pub(crate) fn define_reactive(&self, key: &str, cx: &EvalContext) -> bool {
        let mut inner = self.inner.borrow_mut();
        match inner.find_mut(key) {
            Some(prop) if prop.tracking.is_none() => {
                prop.tracking = Some(Tracking {
                    dep: Dep::new(),
                    cx: cx.clone(),
                });
                true
            }
            _ => false,
        }
    }
}

impl<K, V> FromIterator<(K, V)> for ReactiveObject
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let obj = ReactiveObject::new();
        {
            let mut inner = obj.inner.borrow_mut();
            for (key, value) in iter {
                let key = key.into();
                let value = value.into();
                if let Some(&i) = inner.index.get(&key) {
                    inner.props[i].value = value;
                } else {
                    let at = inner.props.len();
                    inner.index.insert(key.clone(), at);
                    inner.props.push(Property {
                        key,
                        value,
                        tracking: None,
                    });
                }
            }
        }
        obj
    }
}

impl fmt::Debug for ReactiveObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        let keys: Vec<&str> = inner.props.iter().map(|p| p.key.as_str()).collect();
        f.debug_struct("ReactiveObject")
            .field("id", &inner.id)
            .field("list", &inner.list)
            .field("keys", &keys)
            .finish()
    }
}

/// Non-owning handle to a [`ReactiveObject`].
#[derive(Clone, Default)]
pub struct WeakObject {
    inner: Weak<RefCell<ObjectInner>>,
}

impl WeakObject {
    /// The object, if any strong handle is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<ReactiveObject> {
        self.inner.upgrade().map(|inner| ReactiveObject { inner })
    }
}

impl fmt::Debug for WeakObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakObject")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}
