//! Loosely-typed argument values
//!
//! Tool arguments arrive as arbitrary JSON. They are converted once into
//! [`Value`], a closed sum type that keeps integers and doubles apart so the
//! extractors can apply exact-integer coercion instead of guessing.

use std::collections::BTreeMap;
use std::fmt;

/// Arguments of a single tool call, keyed by argument name
pub type Arguments = BTreeMap<String, Value>;

/// A loosely-typed input value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// Stable tag name, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                // u64 beyond i64::MAX and every non-integral literal
                None => Value::Double(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            ),
        }
    }
}

/// Convert a JSON-RPC `arguments` object into [`Arguments`]
pub fn arguments_from_json(map: serde_json::Map<String, serde_json::Value>) -> Arguments {
    map.into_iter().map(|(k, v)| (k, Value::from(v))).collect()
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Double(d) => write!(f, "{}", d),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Object(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}: {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numbers_keep_int_and_double_apart() {
        assert_eq!(Value::from(json!(20)), Value::Int(20));
        assert_eq!(Value::from(json!(20.0)), Value::Double(20.0));
        assert_eq!(Value::from(json!(10.5)), Value::Double(10.5));
        assert_eq!(Value::from(json!(-3)), Value::Int(-3));
    }

    #[test]
    fn test_huge_unsigned_becomes_double() {
        let v = Value::from(json!(u64::MAX));
        assert_eq!(v.kind(), "double");
    }

    #[test]
    fn test_nested_conversion() {
        let args = arguments_from_json(
            json!({"flags": ["cmd", 1], "opts": {"a": null}})
                .as_object()
                .cloned()
                .unwrap(),
        );
        assert_eq!(
            args["flags"],
            Value::Array(vec![Value::String("cmd".into()), Value::Int(1)])
        );
        let Value::Object(opts) = &args["opts"] else {
            panic!("expected object");
        };
        assert!(opts["a"].is_null());
    }

    #[test]
    fn test_display() {
        let v = Value::Array(vec![Value::String("a".into()), Value::Bool(true)]);
        assert_eq!(v.to_string(), "[\"a\", true]");
    }
}
