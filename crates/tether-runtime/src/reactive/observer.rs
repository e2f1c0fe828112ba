#![forbid(unsafe_code)]

//! Recursive instrumentation of object graphs.

use ahash::AHashSet;

use super::context::EvalContext;
use super::object::ReactiveObject;
use crate::value::Value;

/// Instrument `value` if it is an object; primitives are left alone.
pub fn observe(value: &Value, cx: &EvalContext) {
    if let Value::Object(obj) = value {
        observe_object(obj, cx);
    }
}

/// Instrument every property of `obj`, depth first, binding each to `cx`.
///
/// Nested objects are instrumented before the property that holds them.
/// Already-instrumented properties keep their `Dep`, and an object reachable
/// from itself is visited once.
pub fn observe_object(obj: &ReactiveObject, cx: &EvalContext) {
    let mut visited = AHashSet::new();
    walk(obj, cx, &mut visited);
}

fn walk(obj: &ReactiveObject, cx: &EvalContext, visited: &mut AHashSet<u64>) {
    if !visited.insert(obj.id()) {
        return;
    }
    for key in obj.keys() {
        if let Value::Object(child) = obj.peek(&key) {
            walk(&child, cx, visited);
        }
        obj.define_reactive(&key, cx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruments_nested_objects() {
        let inner: ReactiveObject = [("deep", 1)].into_iter().collect();
        let outer: ReactiveObject = [
            ("a", Value::from(1)),
            ("inner", Value::from(inner.clone())),
        ]
        .into_iter()
        .collect();
        observe(&Value::from(outer.clone()), &EvalContext::new());
        assert!(outer.is_reactive("a"));
        assert!(outer.is_reactive("inner"));
        assert!(inner.is_reactive("deep"));
    }

    #[test]
    fn primitives_are_ignored() {
        observe(&Value::from(3), &EvalContext::new());
        observe(&Value::Null, &EvalContext::new());
    }

    #[test]
    fn cycles_terminate() {
        let obj: ReactiveObject = [("x", 1)].into_iter().collect();
        obj.set("me", obj.clone()).unwrap();
        observe_object(&obj, &EvalContext::new());
        assert!(obj.is_reactive("x"));
        assert!(obj.is_reactive("me"));
    }

    #[test]
    fn reobserving_keeps_deps() {
        let obj: ReactiveObject = [("k", "v")].into_iter().collect();
        let cx = EvalContext::new();
        observe_object(&obj, &cx);
        let dep = obj.dep("k").unwrap();
        observe_object(&obj, &cx);
        assert!(dep.ptr_eq(&obj.dep("k").unwrap()));
    }
}
