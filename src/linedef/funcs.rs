//! Scalar function registry
//!
//! Grammar definitions refer to conversion functions by name: `int`,
//! `str`, or anything the caller registers before compiling. The same
//! namespace serves three roles: fragment parsing (the function receives
//! the fragment as text), trimming inside an encapsulated block, and the
//! `/name` post-parse callbacks (the function receives the finished value).
//!
//! A function returning `Ok(None)` means "no value": list-like collectors
//! skip the entry entirely rather than storing anything for it.

use crate::linedef::error::ParseError;
use crate::linedef::value::Value;
use regex::Regex;
use std::collections::HashMap;
use std::rc::Rc;

/// Result of a scalar function application.
pub type FuncResult = Result<Option<Value>, ParseError>;

/// A named conversion function. Shared handles: the same function may sit
/// in several places of one parser tree.
pub type Func = Rc<dyn Fn(Value) -> FuncResult>;

/// Name → function table used by the grammar compiler.
///
/// Entries are never removed; registering an existing name shadows the
/// earlier entry. The registry lives as long as the definition compiled
/// against it.
pub struct Registry {
    funcs: HashMap<String, Func>,
}

impl Registry {
    /// An empty registry with no functions at all.
    pub fn empty() -> Self {
        Registry {
            funcs: HashMap::new(),
        }
    }

    /// A registry seeded with the standard conversions:
    ///
    /// - `int`: integer conversion (surrounding whitespace tolerated)
    /// - `str`: identity text
    /// - `ignore`: discards the fragment, producing empty text
    pub fn new() -> Self {
        let mut registry = Registry::empty();
        registry.put_text("int", |s| match s.trim().parse::<i64>() {
            Ok(n) => Ok(Some(Value::Int(n))),
            Err(e) => Err(ParseError::Fragment {
                fragment: s.to_string(),
                message: format!("invalid integer: {}", e),
            }),
        });
        registry.put_text("str", |s| Ok(Some(Value::Str(s.to_string()))));
        registry.put_text("ignore", |_| Ok(Some(Value::Str(String::new()))));
        registry
    }

    /// Register a function operating on values.
    ///
    /// Use this for post-parse callbacks or any function that needs to see
    /// structured input. For plain text conversions prefer [`put_text`].
    ///
    /// [`put_text`]: Registry::put_text
    pub fn put<F>(&mut self, name: &str, func: F)
    where
        F: Fn(Value) -> FuncResult + 'static,
    {
        self.funcs.insert(name.to_string(), Rc::new(func));
    }

    /// Register a text conversion function.
    ///
    /// The wrapper rejects non-text input, so a text function accidentally
    /// used as a value callback fails loudly instead of misbehaving.
    pub fn put_text<F>(&mut self, name: &str, func: F)
    where
        F: Fn(&str) -> FuncResult + 'static,
    {
        self.put(name, move |value| match value {
            Value::Str(s) => func(&s),
            other => Err(ParseError::Fragment {
                fragment: other.to_string(),
                message: "expected a text fragment".to_string(),
            }),
        });
    }

    /// Register a capture-based text conversion.
    ///
    /// The function extracts the pattern's first capture group from the
    /// fragment as text. Fragments the pattern does not match are rejected.
    /// Compiled once, at registration.
    ///
    /// Irregular fields are usually easiest to pick apart this way:
    /// `mem\[(\d+)\]` pulls the address out of `mem[8]`-style text.
    pub fn put_capture(&mut self, name: &str, pattern: Regex) {
        self.put_text(name, move |s| {
            let captures = pattern.captures(s).ok_or_else(|| ParseError::Fragment {
                fragment: s.to_string(),
                message: format!("does not match pattern {}", pattern.as_str()),
            })?;
            match captures.get(1) {
                Some(group) => Ok(Some(Value::Str(group.as_str().to_string()))),
                None => Err(ParseError::Fragment {
                    fragment: s.to_string(),
                    message: "pattern has no capture group".to_string(),
                }),
            }
        });
    }

    /// Look up a function handle by name.
    pub fn get(&self, name: &str) -> Option<Func> {
        self.funcs.get(name).cloned()
    }

    /// All registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.funcs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::new()
    }
}

/// Translate characters of `input`: each character found in `from` is
/// replaced by the character at the same position in `to`.
///
/// Handy for registering substitution scalars, e.g. mapping `BFRL` seat
/// codes onto `1010` before an integer conversion:
///
/// ```text
/// registry.put_text("seat", |s| {
///     let bits = tr(s, "BFRL", "1010");
///     ...
/// });
/// ```
pub fn tr(input: &str, from: &str, to: &str) -> String {
    input
        .chars()
        .map(|c| match from.chars().position(|f| f == c) {
            Some(i) => to.chars().nth(i).unwrap_or(c),
            None => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_int() {
        let registry = Registry::new();
        let int = registry.get("int").unwrap();
        assert_eq!(int(Value::from(" 42")), Ok(Some(Value::Int(42))));
        assert!(int(Value::from("x")).is_err());
    }

    #[test]
    fn test_builtin_str_and_ignore() {
        let registry = Registry::new();
        let str_fn = registry.get("str").unwrap();
        assert_eq!(str_fn(Value::from("abc")), Ok(Some(Value::from("abc"))));

        let ignore = registry.get("ignore").unwrap();
        assert_eq!(ignore(Value::from("abc")), Ok(Some(Value::from(""))));
    }

    #[test]
    fn test_put_text_rejects_structured_input() {
        let registry = Registry::new();
        let int = registry.get("int").unwrap();
        assert!(int(Value::List(vec![])).is_err());
    }

    #[test]
    fn test_later_registration_shadows() {
        let mut registry = Registry::new();
        registry.put_text("int", |_| Ok(Some(Value::Int(0))));
        let int = registry.get("int").unwrap();
        assert_eq!(int(Value::from("42")), Ok(Some(Value::Int(0))));
    }

    #[test]
    fn test_put_capture() {
        let mut registry = Registry::new();
        registry.put_capture("mem_addr", Regex::new(r"mem\[(\d+)\]").unwrap());
        let mem_addr = registry.get("mem_addr").unwrap();
        assert_eq!(
            mem_addr(Value::from("mem[8]")),
            Ok(Some(Value::from("8")))
        );
        assert!(mem_addr(Value::from("mask")).is_err());
    }

    #[test]
    fn test_missing_name() {
        let registry = Registry::new();
        assert!(registry.get("frobnicate").is_none());
    }

    #[test]
    fn test_tr() {
        assert_eq!(tr("FBFBBFFRLR", "BFRL", "1010"), "0101100101");
        assert_eq!(tr("abc", "", ""), "abc");
    }
}
