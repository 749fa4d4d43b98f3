//! Grammar compiler
//!
//! Walks grammar text one line at a time, asks the engine for each line's
//! tagged node, and instantiates the matching fragment combinator or stream
//! builder. Builder groups (`((`, `[[`, `{{`) recurse until their close
//! marker; bare fragment lines become implicit single-line builders.
//!
//! All structural rules are enforced here, before any input is parsed: a
//! list builder owns exactly one child, a hash builder's child must be a
//! pair or pair-line form, function names must resolve against the
//! registry, and every open marker must be closed.

use crate::linedef::blocks::Block;
use crate::linedef::builders::{Builder, ListChild};
use crate::linedef::definition::Definition;
use crate::linedef::error::CompileError;
use crate::linedef::funcs::{Func, Registry};
use crate::linedef::grammar::{engine, GroupKind, LiteralSpec, Node, Term};
use tracing::debug;

/// Compile grammar text into a definition over `registry`.
///
/// Blank lines between top-level forms are ignored; inside a builder group
/// every line is significant.
pub fn compile(grammar: &str, registry: Registry) -> Result<Definition, CompileError> {
    let lines: Vec<(usize, String)> = grammar
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| (i + 1, line.to_string()))
        .collect();

    let mut builders = Vec::new();
    {
        let compiler = Compiler {
            registry: &registry,
            lines: &lines,
        };
        let mut cursor = 0;
        while cursor < lines.len() {
            let (line_no, node) = compiler.node(cursor)?;
            cursor += 1;
            builders.push(compiler.builder(line_no, node, &mut cursor)?);
        }
    }
    debug!(builders = builders.len(), "grammar compiled");

    let mut definition = Definition::new(registry);
    for builder in builders {
        definition.add_builder(builder);
    }
    Ok(definition)
}

struct Compiler<'c> {
    registry: &'c Registry,
    lines: &'c [(usize, String)],
}

impl<'c> Compiler<'c> {
    fn node(&self, cursor: usize) -> Result<(usize, Node), CompileError> {
        let (line_no, text) = &self.lines[cursor];
        match engine::match_line(text) {
            Ok(node) => Ok((*line_no, node)),
            Err(err) => Err(CompileError::Syntax {
                line_no: *line_no,
                line: text.trim().to_string(),
                message: err.message,
            }),
        }
    }

    fn line_text(&self, cursor: usize) -> String {
        self.lines[cursor].1.trim().to_string()
    }

    fn func(&self, name: &str, line_no: usize) -> Result<Func, CompileError> {
        self.registry
            .get(name)
            .ok_or_else(|| CompileError::UnknownFunction {
                line_no,
                name: name.to_string(),
            })
    }

    /// Build one stream builder starting at an already-fetched node.
    /// `cursor` sits on the line after that node and is left on the line
    /// after the builder's close.
    fn builder(
        &self,
        line_no: usize,
        node: Node,
        cursor: &mut usize,
    ) -> Result<Builder, CompileError> {
        match node {
            Node::Open(GroupKind::Composite) => self.composite_group(line_no, cursor),
            Node::Open(GroupKind::List) => self.list_group(line_no, cursor),
            Node::Open(GroupKind::Hash) => self.hash_group(line_no, cursor),
            Node::Close { .. } => Err(CompileError::MismatchedClose {
                line_no,
                line: self.line_text(*cursor - 1),
            }),
            fragment => Ok(Builder::single_line(self.block(fragment, line_no)?)),
        }
    }

    fn composite_group(
        &self,
        open_line_no: usize,
        cursor: &mut usize,
    ) -> Result<Builder, CompileError> {
        let mut children = Vec::new();
        loop {
            let (line_no, node) = self.child_node(open_line_no, "composite", cursor)?;
            match node {
                Node::Close {
                    kind,
                    sentinel,
                    callback,
                } => {
                    self.check_close(kind, GroupKind::Composite, line_no, cursor)?;
                    let builder =
                        Builder::composite(children, sentinel.as_deref().unwrap_or_default());
                    return self.finish(builder, callback, line_no);
                }
                other => children.push(self.builder(line_no, other, cursor)?),
            }
        }
    }

    fn list_group(
        &self,
        open_line_no: usize,
        cursor: &mut usize,
    ) -> Result<Builder, CompileError> {
        let mut child: Option<ListChild> = None;
        loop {
            let (line_no, node) = self.child_node(open_line_no, "list", cursor)?;
            match node {
                Node::Close {
                    kind,
                    sentinel,
                    callback,
                } => {
                    self.check_close(kind, GroupKind::List, line_no, cursor)?;
                    let child = child.ok_or(CompileError::Arity {
                        line_no,
                        builder: "list",
                        message: "requires exactly one child, found none".to_string(),
                    })?;
                    let builder = Builder::list(child, sentinel.as_deref().unwrap_or_default());
                    return self.finish(builder, callback, line_no);
                }
                other => {
                    if child.is_some() {
                        return Err(CompileError::Arity {
                            line_no,
                            builder: "list",
                            message: "accepts exactly one child, found a second".to_string(),
                        });
                    }
                    child = Some(match other {
                        open @ Node::Open(_) => {
                            ListChild::from(self.builder(line_no, open, cursor)?)
                        }
                        fragment => ListChild::from(self.block(fragment, line_no)?),
                    });
                }
            }
        }
    }

    fn hash_group(
        &self,
        open_line_no: usize,
        cursor: &mut usize,
    ) -> Result<Builder, CompileError> {
        let mut child: Option<Block> = None;
        loop {
            let (line_no, node) = self.child_node(open_line_no, "hash", cursor)?;
            match node {
                Node::Close {
                    kind,
                    sentinel,
                    callback,
                } => {
                    self.check_close(kind, GroupKind::Hash, line_no, cursor)?;
                    let child = child.ok_or(CompileError::Arity {
                        line_no,
                        builder: "hash",
                        message: "requires exactly one child, found none".to_string(),
                    })?;
                    let builder = Builder::hash(child, sentinel.as_deref().unwrap_or_default());
                    return self.finish(builder, callback, line_no);
                }
                Node::Open(_) => return Err(CompileError::HashChild { line_no }),
                fragment => {
                    if child.is_some() {
                        return Err(CompileError::Arity {
                            line_no,
                            builder: "hash",
                            message: "accepts exactly one child, found a second".to_string(),
                        });
                    }
                    let block = self.block(fragment, line_no)?;
                    if !block.is_pairing() {
                        return Err(CompileError::HashChild { line_no });
                    }
                    child = Some(block);
                }
            }
        }
    }

    /// Fetch and advance past the next node inside a builder group, failing
    /// when the grammar ends before the group's close marker.
    fn child_node(
        &self,
        open_line_no: usize,
        builder: &'static str,
        cursor: &mut usize,
    ) -> Result<(usize, Node), CompileError> {
        if *cursor >= self.lines.len() {
            return Err(CompileError::UnterminatedBuilder {
                line_no: open_line_no,
                builder,
            });
        }
        let fetched = self.node(*cursor)?;
        *cursor += 1;
        Ok(fetched)
    }

    fn check_close(
        &self,
        found: GroupKind,
        expected: GroupKind,
        line_no: usize,
        cursor: &mut usize,
    ) -> Result<(), CompileError> {
        if found == expected {
            Ok(())
        } else {
            Err(CompileError::MismatchedClose {
                line_no,
                line: self.line_text(*cursor - 1),
            })
        }
    }

    fn finish(
        &self,
        builder: Builder,
        callback: Option<String>,
        line_no: usize,
    ) -> Result<Builder, CompileError> {
        match callback {
            Some(name) => Ok(builder.with_callback(self.func(&name, line_no)?)),
            None => Ok(builder),
        }
    }

    /// Compile a fragment node, resolving names against the registry.
    fn block(&self, node: Node, line_no: usize) -> Result<Block, CompileError> {
        match node {
            Node::Literal { spec, callback } => {
                let block = match spec {
                    None => Block::LiteralExact { expected: None },
                    Some(LiteralSpec::Exact(text)) => Block::LiteralExact {
                        expected: Some(text),
                    },
                    Some(LiteralSpec::Func(name)) => Block::Literal {
                        func: self.func(&name, line_no)?,
                    },
                };
                self.wrap(block, callback, line_no)
            }
            Node::List {
                element,
                delimiter,
                callback,
            } => {
                let block = Block::List {
                    element: self.func(&element, line_no)?,
                    delimiter,
                };
                self.wrap(block, callback, line_no)
            }
            Node::Set {
                element,
                delimiter,
                callback,
            } => {
                let block = Block::Set {
                    element: self.func(&element, line_no)?,
                    delimiter,
                };
                self.wrap(block, callback, line_no)
            }
            Node::Munch {
                element,
                vocabulary,
                delimiter,
                callback,
            } => {
                let block = Block::Munch {
                    vocabulary,
                    element: self.func(&element, line_no)?,
                    delimiter,
                };
                self.wrap(block, callback, line_no)
            }
            Node::HashPair {
                reverse,
                distribute,
                key,
                value,
                separator,
                callback,
            } => {
                let block = Block::HashPair {
                    key: Box::new(self.term(key, line_no)?),
                    value: Box::new(self.term(value, line_no)?),
                    separator,
                    distribute,
                    reverse,
                };
                self.wrap(block, callback, line_no)
            }
            Node::HashLine {
                reverse,
                key,
                value,
                separator,
                item_delimiter,
                callback,
            } => {
                let pair = Block::HashPair {
                    key: Box::new(self.term(key, line_no)?),
                    value: Box::new(self.term(value, line_no)?),
                    separator,
                    distribute: false,
                    reverse,
                };
                let block = Block::HashLine {
                    pair: Box::new(pair),
                    delimiter: item_delimiter,
                };
                self.wrap(block, callback, line_no)
            }
            Node::Multi {
                blocks,
                delimiter,
                callback,
            } => {
                let mut compiled = Vec::new();
                for child in blocks {
                    compiled.push(self.block(child, line_no)?);
                }
                let block = Block::Multi {
                    blocks: compiled,
                    delimiter,
                };
                self.wrap(block, callback, line_no)
            }
            Node::Or { alternatives } => {
                let mut compiled = Vec::new();
                for alternative in alternatives {
                    compiled.push(self.block(alternative, line_no)?);
                }
                Ok(Block::Or {
                    alternatives: compiled,
                })
            }
            Node::Encapsulated { inner, trim } => Ok(Block::Encapsulated {
                trim: self.func(&trim, line_no)?,
                inner: Box::new(self.block(*inner, line_no)?),
            }),
            // The engine never nests builder markers inside a fragment payload.
            Node::Open(_) | Node::Close { .. } => unreachable!(),
        }
    }

    fn term(&self, term: Term, line_no: usize) -> Result<Block, CompileError> {
        match term {
            Term::Name(name) => Ok(Block::Literal {
                func: self.func(&name, line_no)?,
            }),
            Term::Block(node) => self.block(*node, line_no),
        }
    }

    fn wrap(
        &self,
        block: Block,
        callback: Option<String>,
        line_no: usize,
    ) -> Result<Block, CompileError> {
        match callback {
            Some(name) => Ok(Block::Postprocess {
                inner: Box::new(block),
                callback: self.func(&name, line_no)?,
            }),
            None => Ok(block),
        }
    }
}
