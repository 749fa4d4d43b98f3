//! Fragment combinators
//!
//! A fragment combinator parses one already-isolated piece of text (a
//! whole line, or one field after a split) into a value. Combinators are
//! stateless, owned exclusively by their parent, and compose recursively:
//! a multi-block splits a line into fields and hands each field to its own
//! child, which may itself be a list, a pair, another multi-block.
//!
//! "No value" (`Ok(None)`) is a first-class outcome: collectors skip such
//! entries instead of storing anything. Failure is a [`ParseError`]; only
//! [`Block::Or`] recovers from failures, and only those of its own
//! alternatives.

use crate::linedef::error::ParseError;
use crate::linedef::funcs::{Func, FuncResult};
use crate::linedef::value::Value;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, trace};

/// One fragment combinator.
///
/// The set of variants is closed: the grammar compiler matches on it
/// exhaustively, and validity rules (what may appear inside a hash builder,
/// how many children a list takes) are checked structurally.
pub enum Block {
    /// Apply a scalar function to the whole fragment.
    Literal { func: Func },
    /// Discard the fragment, optionally insisting it equals a fixed marker.
    LiteralExact { expected: Option<String> },
    /// Try alternatives in order on the same fragment; first success wins.
    Or { alternatives: Vec<Block> },
    /// Transform the fragment (e.g. strip a trailing character), then
    /// delegate the result to the inner combinator.
    Encapsulated { trim: Func, inner: Box<Block> },
    /// Split on a delimiter and zip the parts with child combinators
    /// positionally. Extra parts and extra children are both ignored.
    Multi { blocks: Vec<Block>, delimiter: String },
    /// Split on a delimiter (or into single characters) and convert each
    /// piece with the element function.
    List {
        element: Func,
        delimiter: Option<String>,
    },
    /// Like `List`, materialized as a set.
    Set {
        element: Func,
        delimiter: Option<String>,
    },
    /// Greedy tokenization over a fixed vocabulary of known symbols.
    Munch {
        vocabulary: Vec<String>,
        element: Func,
        delimiter: Option<String>,
    },
    /// Split into exactly two parts and produce a single-entry mapping.
    HashPair {
        key: Box<Block>,
        value: Box<Block>,
        separator: String,
        distribute: bool,
        reverse: bool,
    },
    /// Split into pair sub-fragments and merge their mappings, last wins.
    HashLine {
        pair: Box<Block>,
        delimiter: Option<String>,
    },
    /// Run the inner combinator, then a callback on its value. Produced by
    /// the `/name` grammar suffix.
    Postprocess { inner: Box<Block>, callback: Func },
}

impl Block {
    /// Wrap a plain text conversion as a literal combinator.
    pub fn literal<F>(func: F) -> Block
    where
        F: Fn(&str) -> FuncResult + 'static,
    {
        Block::Literal {
            func: std::rc::Rc::new(move |value| match value {
                Value::Str(s) => func(&s),
                other => Err(ParseError::Fragment {
                    fragment: other.to_string(),
                    message: "expected a text fragment".to_string(),
                }),
            }),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Block::Literal { .. } => "literal",
            Block::LiteralExact { .. } => "literal-exact",
            Block::Or { .. } => "or",
            Block::Encapsulated { .. } => "encapsulated",
            Block::Multi { .. } => "multi",
            Block::List { .. } => "list",
            Block::Set { .. } => "set",
            Block::Munch { .. } => "munch",
            Block::HashPair { .. } => "hash-pair",
            Block::HashLine { .. } => "hash-line",
            Block::Postprocess { .. } => "postprocess",
        }
    }

    /// Whether this combinator produces a mapping, the only shape a hash
    /// builder accepts. Looks through a postprocess wrapper.
    pub fn is_pairing(&self) -> bool {
        match self {
            Block::HashPair { .. } | Block::HashLine { .. } => true,
            Block::Postprocess { inner, .. } => inner.is_pairing(),
            _ => false,
        }
    }

    /// Parse one fragment.
    pub fn parse(&self, fragment: &str) -> Result<Option<Value>, ParseError> {
        debug!(kind = self.kind(), fragment, "parse fragment");
        match self {
            Block::Literal { func } => func(Value::Str(fragment.to_string())),
            Block::LiteralExact { expected } => {
                if let Some(expected) = expected {
                    if fragment != expected {
                        return Err(ParseError::Fragment {
                            fragment: fragment.to_string(),
                            message: format!("expected literal \"{}\"", expected),
                        });
                    }
                }
                Ok(None)
            }
            Block::Or { alternatives } => {
                for alternative in alternatives {
                    match alternative.parse(fragment) {
                        Ok(value) => return Ok(value),
                        Err(err) => trace!(%err, "alternative failed, trying next"),
                    }
                }
                Err(ParseError::NoAlternative {
                    fragment: fragment.to_string(),
                })
            }
            Block::Encapsulated { trim, inner } => {
                match trim(Value::Str(fragment.to_string()))? {
                    Some(Value::Str(trimmed)) => inner.parse(&trimmed),
                    _ => Err(ParseError::TrimNotText {
                        fragment: fragment.to_string(),
                    }),
                }
            }
            Block::Multi { blocks, delimiter } => {
                let mut items = Vec::new();
                for (part, block) in fragment.split(delimiter.as_str()).zip(blocks.iter()) {
                    if let Some(value) = block.parse(part)? {
                        items.push(value);
                    }
                }
                Ok(Some(Value::collapsed(items)))
            }
            Block::List { element, delimiter } => {
                let mut items = Vec::new();
                for piece in split_units(fragment, delimiter) {
                    if let Some(value) = element(Value::Str(piece))? {
                        items.push(value);
                    }
                }
                Ok(Some(Value::List(items)))
            }
            Block::Set { element, delimiter } => {
                let mut items = std::collections::BTreeSet::new();
                for piece in split_units(fragment, delimiter) {
                    if let Some(value) = element(Value::Str(piece))? {
                        items.insert(value);
                    }
                }
                Ok(Some(Value::Set(items)))
            }
            Block::Munch {
                vocabulary,
                element,
                delimiter,
            } => {
                let joiner = delimiter.as_deref().unwrap_or("");
                let mut tokens = Vec::new();
                let mut candidate: Vec<String> = Vec::new();
                for unit in split_units(fragment, delimiter) {
                    candidate.push(unit);
                    let joined = candidate.join(joiner);
                    if let Some(value) = element(Value::Str(joined))? {
                        let known = match &value {
                            Value::Str(s) => vocabulary.iter().any(|v| v == s),
                            _ => false,
                        };
                        if known {
                            tokens.push(value);
                            candidate.clear();
                        }
                    }
                }
                if !candidate.is_empty() {
                    // Input was not exactly tileable by the vocabulary; the
                    // trailing partial token is dropped.
                    debug!(
                        leftover = candidate.join(joiner),
                        "incomplete trailing token in munch"
                    );
                }
                Ok(Some(Value::List(tokens)))
            }
            Block::HashPair {
                key,
                value,
                separator,
                distribute,
                reverse,
            } => {
                let parts: Vec<&str> = fragment.split(separator.as_str()).collect();
                if parts.len() != 2 {
                    return Err(ParseError::PairShape {
                        fragment: fragment.to_string(),
                        separator: separator.clone(),
                    });
                }
                let (raw_key, raw_value) = if *reverse {
                    (parts[1], parts[0])
                } else {
                    (parts[0], parts[1])
                };

                // The key parser always runs so its failures surface, even
                // though only distribute mode uses its result.
                let parsed_key = key.parse(raw_key)?;
                let stored = value.parse(raw_value)?.unwrap_or(Value::Null);

                let mut map = BTreeMap::new();
                if *distribute {
                    let key_value = parsed_key.ok_or_else(|| ParseError::DistributeKey {
                        fragment: fragment.to_string(),
                    })?;
                    let elements =
                        key_value
                            .elements()
                            .ok_or_else(|| ParseError::DistributeKey {
                                fragment: fragment.to_string(),
                            })?;
                    for element in elements {
                        map.insert(element.clone(), stored.clone());
                    }
                } else {
                    // Keyed by the raw key text; the parsed key only matters
                    // in distribute mode.
                    map.insert(Value::Str(raw_key.to_string()), stored);
                }
                Ok(Some(Value::Map(map)))
            }
            Block::HashLine { pair, delimiter } => {
                let pieces: Vec<String> = match delimiter {
                    Some(d) => fragment.split(d.as_str()).map(str::to_string).collect(),
                    None => vec![fragment.to_string()],
                };
                let mut map = BTreeMap::new();
                for piece in pieces {
                    match pair.parse(&piece)? {
                        Some(Value::Map(entries)) => map.extend(entries),
                        Some(_) => {
                            return Err(ParseError::Fragment {
                                fragment: piece,
                                message: "pair parser must produce a mapping".to_string(),
                            })
                        }
                        None => {}
                    }
                }
                Ok(Some(Value::Map(map)))
            }
            Block::Postprocess { inner, callback } => match inner.parse(fragment)? {
                Some(value) => callback(value),
                None => Ok(None),
            },
        }
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Block::LiteralExact { expected } => {
                f.debug_struct("LiteralExact").field("expected", expected).finish()
            }
            Block::Or { alternatives } => f.debug_tuple("Or").field(alternatives).finish(),
            Block::Multi { blocks, delimiter } => f
                .debug_struct("Multi")
                .field("blocks", blocks)
                .field("delimiter", delimiter)
                .finish(),
            Block::Munch {
                vocabulary,
                delimiter,
                ..
            } => f
                .debug_struct("Munch")
                .field("vocabulary", vocabulary)
                .field("delimiter", delimiter)
                .finish_non_exhaustive(),
            Block::HashPair {
                key,
                value,
                separator,
                distribute,
                reverse,
            } => f
                .debug_struct("HashPair")
                .field("key", key)
                .field("value", value)
                .field("separator", separator)
                .field("distribute", distribute)
                .field("reverse", reverse)
                .finish(),
            Block::HashLine { pair, delimiter } => f
                .debug_struct("HashLine")
                .field("pair", pair)
                .field("delimiter", delimiter)
                .finish(),
            other => write!(f, "{}", other.kind()),
        }
    }
}

/// Split a fragment into units: delimiter-separated pieces, or single
/// characters when no delimiter is given.
fn split_units(fragment: &str, delimiter: &Option<String>) -> Vec<String> {
    match delimiter {
        Some(d) => fragment.split(d.as_str()).map(str::to_string).collect(),
        None => fragment.chars().map(|c| c.to_string()).collect(),
    }
}
