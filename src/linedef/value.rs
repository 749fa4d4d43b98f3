//! Result values produced by fragment combinators and stream builders
//!
//! A parse run produces one `Value`: a scalar, or an arbitrarily nested
//! arrangement of lists, sets, and mappings. Collections are ordered
//! (`BTreeSet`/`BTreeMap`) so results compare and serialize
//! deterministically, and `Value` itself is `Ord` so it can be used as a
//! set element or mapping key.
//!
//! `Null` is a real value, distinct from the "no value" skip marker used in
//! accumulation: skipped results never enter a collection, while `Null` is
//! what a pair stores when its value parser deliberately produced nothing.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// One parsed value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Int(i64),
    Str(String),
    List(Vec<Value>),
    Set(BTreeSet<Value>),
    Map(BTreeMap<Value, Value>),
}

impl Value {
    /// Text content, if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Integer content, if this is an `Int`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Iterate the elements of a list or set value.
    ///
    /// Returns `None` for scalars and mappings; distribute-mode pairs use
    /// this to fan a value out over the parsed key's elements.
    pub fn elements(&self) -> Option<Box<dyn Iterator<Item = &Value> + '_>> {
        match self {
            Value::List(items) => Some(Box::new(items.iter())),
            Value::Set(items) => Some(Box::new(items.iter())),
            _ => None,
        }
    }

    /// Build a list value, collapsing a singleton to its only element.
    ///
    /// This is the uniform collapse rule used by the list and composite
    /// stream builders and the multi-block fragment combinator.
    pub fn collapsed(mut items: Vec<Value>) -> Value {
        if items.len() == 1 {
            items.pop().unwrap_or(Value::Null)
        } else {
            Value::List(items)
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Int(n) => write!(f, "{}", n),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Set(items) => {
                write!(f, "{{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "}}")
            }
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}
