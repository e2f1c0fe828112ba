#![forbid(unsafe_code)]

//! Dynamically typed values stored in reactive objects.
//!
//! Equality is *strict*: primitives compare by value (so `NaN != NaN` and
//! `0 == -0`), objects compare by identity. Watchers rely on this to decide
//! whether a property genuinely changed.

use std::fmt;

use crate::reactive::ReactiveObject;

#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Object(ReactiveObject),
}

impl Value {
    /// Strict equality: same variant and same primitive value, or the same
    /// object instance.
    #[must_use]
    pub fn strict_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    #[must_use]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    #[must_use]
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&ReactiveObject> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Object(_) => "object",
        }
    }

    /// String form of the value (`undefined`, `null`, `true`, `42`, `1.5`,
    /// `NaN`, `Infinity`, `[object Object]`). Numbers use plain decimals
    /// between `1e-6` and `1e21` and exponent form (`1e+21`, `1e-7`) outside.
    #[must_use]
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::String(s) => s.clone(),
            Value::Object(_) => "[object Object]".to_string(),
        }
    }

    /// What a binding writes into the view: like
    /// [`to_display_string`](Self::to_display_string), except `Undefined`
    /// renders as the empty string.
    #[must_use]
    pub fn to_render_string(&self) -> String {
        match self {
            Value::Undefined => String::new(),
            other => other.to_display_string(),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let s = if n > 0.0 { "Infinity" } else { "-Infinity" };
        s.to_string()
    } else if n == 0.0 {
        // Covers -0.
        "0".to_string()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        // Shortest digits in exponent form, with an explicit `+` on
        // positive exponents: `1e+21`, `1.5e-7`.
        let s = format!("{n:e}");
        match s.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => s,
        }
    } else {
        n.to_string()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.strict_eq(other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("Undefined"),
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Value::String(s) => f.debug_tuple("String").field(s).finish(),
            // Objects may be cyclic; show identity and shape only.
            Value::Object(obj) => f
                .debug_struct("Object")
                .field("id", &obj.id())
                .field("keys", &obj.keys())
                .finish(),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<ReactiveObject> for Value {
    fn from(obj: ReactiveObject) -> Self {
        Value::Object(obj)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

#[cfg(feature = "json")]
impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            Json::String(s) => Value::String(s),
            Json::Array(items) => {
                Value::Object(ReactiveObject::list(items.into_iter().map(Value::from)))
            }
            Json::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

#[cfg(feature = "json")]
impl Value {
    /// Snapshot as JSON. Reads are untracked. `Undefined` and non-finite
    /// numbers become `null`; integral numbers within the exactly
    /// representable range become JSON integers; list objects become arrays;
    /// an object nested inside itself is cut off as `null`.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        self.to_json_inner(&mut Vec::new())
    }

    fn to_json_inner(&self, path: &mut Vec<u64>) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Value::Undefined | Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Number(n) => json_number(*n),
            Value::String(s) => Json::String(s.clone()),
            Value::Object(obj) => {
                if path.contains(&obj.id()) {
                    return Json::Null;
                }
                path.push(obj.id());
                let json = if obj.is_list() {
                    Json::Array(
                        obj.keys()
                            .iter()
                            .map(|key| obj.peek(key).to_json_inner(path))
                            .collect(),
                    )
                } else {
                    Json::Object(
                        obj.keys()
                            .into_iter()
                            .map(|key| {
                                let value = obj.peek(&key).to_json_inner(path);
                                (key, value)
                            })
                            .collect(),
                    )
                };
                path.pop();
                json
            }
        }
    }
}

/// Largest integer `f64` holds exactly (2^53 - 1).
#[cfg(feature = "json")]
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

#[cfg(feature = "json")]
fn json_number(n: f64) -> serde_json::Value {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        // Exact: integral and within the safe range. `-0` lands on `0`.
        serde_json::Value::Number((n as i64).into())
    } else {
        serde_json::Number::from_f64(n).map_or(serde_json::Value::Null, serde_json::Value::Number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_equality_of_primitives() {
        assert_eq!(Value::from(1), Value::from(1.0));
        assert_ne!(Value::from(1), Value::from("1"));
        assert_ne!(Value::Null, Value::Undefined);
        assert_ne!(Value::from(f64::NAN), Value::from(f64::NAN));
        assert_eq!(Value::from(0.0), Value::from(-0.0));
    }

    #[test]
    fn objects_compare_by_identity() {
        let a = ReactiveObject::new();
        let b = ReactiveObject::new();
        assert_eq!(Value::from(a.clone()), Value::from(a));
        assert_ne!(Value::from(b), Value::from(ReactiveObject::new()));
    }

    #[test]
    fn display_strings() {
        assert_eq!(Value::Undefined.to_display_string(), "undefined");
        assert_eq!(Value::Null.to_display_string(), "null");
        assert_eq!(Value::from(true).to_display_string(), "true");
        assert_eq!(Value::from(3).to_display_string(), "3");
        assert_eq!(Value::from(1.5).to_display_string(), "1.5");
        assert_eq!(Value::from(-0.0).to_display_string(), "0");
        assert_eq!(Value::from(f64::NAN).to_display_string(), "NaN");
        assert_eq!(Value::from(f64::NEG_INFINITY).to_display_string(), "-Infinity");
        assert_eq!(Value::from(1e21).to_display_string(), "1e+21");
        assert_eq!(Value::from(-2.5e22).to_display_string(), "-2.5e+22");
        assert_eq!(Value::from(1e20).to_display_string(), "100000000000000000000");
        assert_eq!(Value::from(1e-7).to_display_string(), "1e-7");
        assert_eq!(Value::from(1.5e-7).to_display_string(), "1.5e-7");
        assert_eq!(Value::from(0.000001).to_display_string(), "0.000001");
        assert_eq!(
            Value::from(ReactiveObject::new()).to_display_string(),
            "[object Object]"
        );
    }

    #[test]
    fn undefined_renders_empty() {
        assert_eq!(Value::Undefined.to_render_string(), "");
        assert_eq!(Value::Null.to_render_string(), "null");
        assert_eq!(Value::from("hi").to_render_string(), "hi");
    }

    #[test]
    fn option_maps_none_to_null() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::from("x"));
    }

    #[cfg(feature = "json")]
    #[test]
    fn json_round_trip_keeps_shape() {
        let json = serde_json::json!({"msg": "hi", "n": 2, "nested": {"ok": true}, "list": [1, 2.5]});
        let value = Value::from(json.clone());
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 4);
        assert!(obj.peek("nested").is_object());
        assert!(obj.peek("list").as_object().unwrap().is_list());
        assert_eq!(obj.peek("n"), Value::from(2));
        assert_eq!(value.to_json(), json);
    }

    #[cfg(feature = "json")]
    #[test]
    fn json_keeps_document_key_order() {
        let value = Value::from(serde_json::json!({"zeta": 1, "alpha": [1, 2]}));
        assert_eq!(value.as_object().unwrap().keys(), ["zeta", "alpha"]);
        assert_eq!(
            serde_json::to_string(&value.to_json()).unwrap(),
            r#"{"zeta":1,"alpha":[1,2]}"#
        );
    }

    #[cfg(feature = "json")]
    #[test]
    fn json_numbers_keep_integer_form_when_exact() {
        assert_eq!(Value::from(3).to_json().to_string(), "3");
        assert_eq!(Value::from(-0.0).to_json().to_string(), "0");
        assert_eq!(Value::from(1.5).to_json().to_string(), "1.5");
        assert_eq!(Value::from(1e300).to_json().to_string(), "1e300");
        assert!(Value::from(f64::NAN).to_json().is_null());
        assert!(Value::from(f64::INFINITY).to_json().is_null());
    }

    #[cfg(feature = "json")]
    #[test]
    fn json_snapshot_cuts_cycles() {
        let obj = ReactiveObject::new();
        obj.set("me", obj.clone()).unwrap();
        assert_eq!(
            Value::from(obj).to_json(),
            serde_json::json!({"me": null})
        );
    }
}
