//! Stream builders
//!
//! A stream builder consumes lines from a [`LineSource`] up to and
//! including its sentinel line, produces one value, and leaves the cursor
//! exactly past that sentinel; callers rely on this hand-off to know where
//! their own next read begins. Builders compose: a list builder may drive a
//! nested builder per record, a composite builder runs a fixed cast of
//! children once per paragraph.
//!
//! A builder reading past the end of input while hunting its sentinel fails
//! with [`ParseError::MissingSentinel`], except when the sentinel is the
//! empty line, which end of input satisfies. Inputs are expected to be
//! well-formed and terminated.

use crate::linedef::blocks::Block;
use crate::linedef::error::ParseError;
use crate::linedef::funcs::Func;
use crate::linedef::source::LineSource;
use crate::linedef::value::Value;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// The child of a list builder: a fragment parser applied to each raw
/// line, or a nested builder handed the cursor (and the current line as its
/// seed) for each record.
pub enum ListChild {
    Fragment(Block),
    Builder(Box<Builder>),
}

impl From<Block> for ListChild {
    fn from(block: Block) -> Self {
        ListChild::Fragment(block)
    }
}

impl From<Builder> for ListChild {
    fn from(builder: Builder) -> Self {
        ListChild::Builder(Box::new(builder))
    }
}

enum BuilderKind {
    SingleLine {
        block: Block,
    },
    SingleLineDiscardTail {
        block: Block,
        sentinel: String,
    },
    Span {
        block: Block,
        separator: String,
        sentinel: String,
    },
    List {
        child: ListChild,
        sentinel: String,
    },
    Hash {
        block: Block,
        sentinel: String,
    },
    Composite {
        children: Vec<Builder>,
        sentinel: String,
    },
}

/// One stream builder, with an optional post-parse callback applied to its
/// final value.
pub struct Builder {
    kind: BuilderKind,
    callback: Option<Func>,
}

impl Builder {
    /// Consume exactly one line and parse it with `block`.
    pub fn single_line(block: Block) -> Builder {
        Builder::from_kind(BuilderKind::SingleLine { block })
    }

    /// Parse one line, then discard lines up to and including `sentinel`.
    pub fn single_line_discard_tail(block: Block, sentinel: &str) -> Builder {
        Builder::from_kind(BuilderKind::SingleLineDiscardTail {
            block,
            sentinel: sentinel.to_string(),
        })
    }

    /// Accumulate lines joined with `separator` until `sentinel`, then
    /// parse the composite line once.
    pub fn span(block: Block, separator: &str, sentinel: &str) -> Builder {
        Builder::from_kind(BuilderKind::Span {
            block,
            separator: separator.to_string(),
            sentinel: sentinel.to_string(),
        })
    }

    /// Parse one record per line (or per nested-builder run) until
    /// `sentinel`, collecting results. A singleton result collapses to the
    /// bare element.
    pub fn list(child: impl Into<ListChild>, sentinel: &str) -> Builder {
        Builder::from_kind(BuilderKind::List {
            child: child.into(),
            sentinel: sentinel.to_string(),
        })
    }

    /// Merge one mapping per line until `sentinel`, last entry winning on
    /// key collisions.
    pub fn hash(block: Block, sentinel: &str) -> Builder {
        Builder::from_kind(BuilderKind::Hash {
            block,
            sentinel: sentinel.to_string(),
        })
    }

    /// Run every child once per paragraph until the outer `sentinel`.
    pub fn composite(children: Vec<Builder>, sentinel: &str) -> Builder {
        Builder::from_kind(BuilderKind::Composite {
            children,
            sentinel: sentinel.to_string(),
        })
    }

    fn from_kind(kind: BuilderKind) -> Builder {
        Builder {
            kind,
            callback: None,
        }
    }

    /// Attach a post-parse callback transforming the final value.
    pub fn with_callback(mut self, callback: Func) -> Builder {
        self.callback = Some(callback);
        self
    }

    fn kind_name(&self) -> &'static str {
        match &self.kind {
            BuilderKind::SingleLine { .. } => "single-line",
            BuilderKind::SingleLineDiscardTail { .. } => "single-line-discard-tail",
            BuilderKind::Span { .. } => "span",
            BuilderKind::List { .. } => "list",
            BuilderKind::Hash { .. } => "hash",
            BuilderKind::Composite { .. } => "composite",
        }
    }

    /// Consume lines from `source` and produce this builder's value.
    ///
    /// `seed` is an already-read current line supplied by an enclosing
    /// builder so chained builders never double-advance the cursor.
    pub fn parse<S: LineSource>(
        &self,
        source: &mut S,
        seed: Option<String>,
    ) -> Result<Option<Value>, ParseError> {
        debug!(kind = self.kind_name(), seed = seed.as_deref(), "run builder");
        let value = self.kind.parse(source, seed)?;
        match (&self.callback, value) {
            (Some(callback), Some(value)) => callback(value),
            (_, value) => Ok(value),
        }
    }
}

impl BuilderKind {
    fn parse<S: LineSource>(
        &self,
        source: &mut S,
        seed: Option<String>,
    ) -> Result<Option<Value>, ParseError> {
        match self {
            BuilderKind::SingleLine { block } => {
                let line = take_line(source, seed);
                block.parse(&line)
            }
            BuilderKind::SingleLineDiscardTail { block, sentinel } => {
                let line = take_line(source, seed);
                let value = block.parse(&line)?;
                loop {
                    if read_control(source, sentinel)? == *sentinel {
                        break;
                    }
                }
                Ok(value)
            }
            BuilderKind::Span {
                block,
                separator,
                sentinel,
            } => {
                let mut composite = seed;
                loop {
                    let line = read_control(source, sentinel)?;
                    if line == *sentinel {
                        break;
                    }
                    composite = Some(match composite {
                        None => line,
                        Some(joined) => format!("{}{}{}", joined, separator, line),
                    });
                }
                block.parse(composite.as_deref().unwrap_or_default())
            }
            BuilderKind::List { child, sentinel } => {
                let mut items = Vec::new();
                let mut line = match seed {
                    Some(line) => line,
                    None => read_control(source, sentinel)?,
                };
                while line != *sentinel {
                    let result = match child {
                        ListChild::Fragment(block) => block.parse(&line)?,
                        ListChild::Builder(builder) => builder.parse(source, Some(line.clone()))?,
                    };
                    if let Some(value) = result {
                        items.push(value);
                    }
                    line = read_control(source, sentinel)?;
                }
                Ok(Some(Value::collapsed(items)))
            }
            BuilderKind::Hash { block, sentinel } => {
                let mut map = BTreeMap::new();
                let mut line = match seed {
                    Some(line) => line,
                    None => read_control(source, sentinel)?,
                };
                while line != *sentinel {
                    match block.parse(&line)? {
                        Some(Value::Map(entries)) => map.extend(entries),
                        _ => return Err(ParseError::NotAMapping { line }),
                    }
                    line = read_control(source, sentinel)?;
                }
                Ok(Some(Value::Map(map)))
            }
            BuilderKind::Composite { children, sentinel } => {
                let mut paragraphs = Vec::new();
                let mut line = match seed {
                    Some(line) => line,
                    None => read_control(source, sentinel)?,
                };
                while line != *sentinel {
                    let mut paragraph = Vec::new();
                    for child in children {
                        // Each child seeds on the line read after its
                        // predecessor; the line read after the last child is
                        // the paragraph control line.
                        if let Some(value) = child.parse(source, Some(line.clone()))? {
                            paragraph.push(value);
                        }
                        line = read_control(source, sentinel)?;
                    }
                    paragraphs.push(Value::collapsed(paragraph));
                }
                Ok(Some(Value::collapsed(paragraphs)))
            }
        }
    }
}

impl fmt::Debug for Builder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Builder");
        s.field("kind", &self.kind_name());
        match &self.kind {
            BuilderKind::SingleLineDiscardTail { sentinel, .. }
            | BuilderKind::Span { sentinel, .. }
            | BuilderKind::List { sentinel, .. }
            | BuilderKind::Hash { sentinel, .. }
            | BuilderKind::Composite { sentinel, .. } => {
                s.field("sentinel", sentinel);
            }
            BuilderKind::SingleLine { .. } => {}
        }
        s.finish_non_exhaustive()
    }
}

/// The seed line if one was supplied, else the next line; end of input
/// reads as the empty line for a single consuming read.
fn take_line<S: LineSource>(source: &mut S, seed: Option<String>) -> String {
    match seed {
        Some(line) => line,
        None => source.next_line().unwrap_or_default(),
    }
}

/// A sentinel-hunting read. End of input satisfies the empty-line sentinel;
/// any other sentinel must actually appear in the input.
fn read_control<S: LineSource>(source: &mut S, sentinel: &str) -> Result<String, ParseError> {
    match source.next_line() {
        Some(line) => Ok(line),
        None if sentinel.is_empty() => Ok(String::new()),
        None => Err(ParseError::MissingSentinel {
            sentinel: sentinel.to_string(),
        }),
    }
}
