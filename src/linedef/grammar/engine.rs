//! One grammar line → one tagged node
//!
//! Recursive descent over the token list, one function per grammar form.
//! The matcher is strict: every token of the line must be consumed, and a
//! line matching no form reports what it was looking at.

use crate::linedef::grammar::node::{GroupKind, LiteralSpec, Node, Term};
use crate::linedef::grammar::tokens::{tokenize, Token};
use std::fmt;

/// A grammar line the engine could not match.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSyntaxError {
    pub message: String,
}

impl LineSyntaxError {
    fn new(message: impl Into<String>) -> Self {
        LineSyntaxError {
            message: message.into(),
        }
    }
}

impl fmt::Display for LineSyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for LineSyntaxError {}

/// Match one grammar line into its tagged node.
pub fn match_line(line: &str) -> Result<Node, LineSyntaxError> {
    let tokens = tokenize(line)
        .map_err(|bad| LineSyntaxError::new(format!("unrecognized token \"{}\"", bad)))?;
    let mut parser = LineParser { tokens, pos: 0 };
    let node = parser.expression()?;
    parser.expect_end()?;
    Ok(node)
}

struct LineParser {
    tokens: Vec<Token>,
    pos: usize,
}

impl LineParser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token, context: &str) -> Result<(), LineSyntaxError> {
        match self.bump() {
            Some(found) if found == token => Ok(()),
            found => Err(LineSyntaxError::new(format!(
                "expected {:?} in {}, found {:?}",
                token, context, found
            ))),
        }
    }

    fn expect_name(&mut self, context: &str) -> Result<String, LineSyntaxError> {
        match self.bump() {
            Some(Token::Name(name)) => Ok(name),
            found => Err(LineSyntaxError::new(format!(
                "expected a function name in {}, found {:?}",
                context, found
            ))),
        }
    }

    fn expect_quoted(&mut self, context: &str) -> Result<String, LineSyntaxError> {
        match self.bump() {
            Some(Token::Quoted(text)) => Ok(text),
            found => Err(LineSyntaxError::new(format!(
                "expected a quoted string in {}, found {:?}",
                context, found
            ))),
        }
    }

    fn expect_end(&self) -> Result<(), LineSyntaxError> {
        match self.peek() {
            None => Ok(()),
            Some(token) => Err(LineSyntaxError::new(format!(
                "trailing tokens starting at {:?}",
                token
            ))),
        }
    }

    /// Quoted delimiter or the `None` no-delimiter marker.
    fn delimiter(&mut self, context: &str) -> Result<Option<String>, LineSyntaxError> {
        match self.bump() {
            Some(Token::Quoted(text)) => Ok(Some(text)),
            Some(Token::NoDelimiter) => Ok(None),
            found => Err(LineSyntaxError::new(format!(
                "expected a quoted delimiter or None in {}, found {:?}",
                context, found
            ))),
        }
    }

    /// Optional `/name` callback suffix.
    fn callback(&mut self) -> Result<Option<String>, LineSyntaxError> {
        if self.eat(&Token::Slash) {
            Ok(Some(self.expect_name("callback")?))
        } else {
            Ok(None)
        }
    }

    fn expression(&mut self) -> Result<Node, LineSyntaxError> {
        match self.peek() {
            Some(Token::OpenComposite) => {
                self.pos += 1;
                Ok(Node::Open(GroupKind::Composite))
            }
            Some(Token::OpenList) => {
                self.pos += 1;
                Ok(Node::Open(GroupKind::List))
            }
            Some(Token::OpenHash) => {
                self.pos += 1;
                Ok(Node::Open(GroupKind::Hash))
            }
            Some(Token::CloseParen) => self.close(GroupKind::Composite, Token::CloseParen),
            Some(Token::CloseBracket) => self.close(GroupKind::List, Token::CloseBracket),
            Some(Token::CloseBrace) => self.close(GroupKind::Hash, Token::CloseBrace),
            _ => self.block(),
        }
    }

    /// All four close forms: bare, +sentinel, +callback, +sentinel+callback,
    /// each with an optionally doubled close marker.
    fn close(&mut self, kind: GroupKind, marker: Token) -> Result<Node, LineSyntaxError> {
        self.pos += 1;
        let sentinel = match self.peek() {
            Some(Token::Quoted(_)) => match self.bump() {
                Some(Token::Quoted(text)) => Some(text),
                _ => None,
            },
            _ => None,
        };
        let callback = self.callback()?;
        self.eat(&marker);
        Ok(Node::Close {
            kind,
            sentinel,
            callback,
        })
    }

    /// A block, with `or`-joined alternatives wherever a block is accepted.
    fn block(&mut self) -> Result<Node, LineSyntaxError> {
        let first = self.block_atom()?;
        if self.peek() != Some(&Token::Or) {
            return Ok(first);
        }
        let mut alternatives = vec![first];
        while self.eat(&Token::Or) {
            alternatives.push(self.block_atom()?);
        }
        Ok(Node::Or { alternatives })
    }

    fn block_atom(&mut self) -> Result<Node, LineSyntaxError> {
        match self.peek() {
            Some(Token::Marker) => self.literal(),
            Some(Token::OpenParen) => self.multi(),
            Some(Token::OpenBracket) => self.list(),
            Some(Token::OpenMunch) => self.munch(),
            Some(Token::OpenSet) => self.set(),
            Some(Token::OpenBrace) => self.hash_pair(false, Token::OpenBrace),
            Some(Token::OpenDistribute) => self.hash_pair(true, Token::OpenDistribute),
            Some(Token::OpenHashLine) => self.hash_line(),
            Some(Token::EncapOpen) => self.encapsulated(),
            found => Err(LineSyntaxError::new(format!(
                "expected a block, found {:?}",
                found
            ))),
        }
    }

    fn literal(&mut self) -> Result<Node, LineSyntaxError> {
        self.expect(Token::Marker, "literal")?;
        let spec = match self.peek() {
            Some(Token::Marker) => None,
            Some(Token::Name(_)) => match self.bump() {
                Some(Token::Name(name)) => Some(LiteralSpec::Func(name)),
                _ => None,
            },
            Some(Token::Quoted(_)) => match self.bump() {
                Some(Token::Quoted(text)) => Some(LiteralSpec::Exact(text)),
                _ => None,
            },
            found => {
                return Err(LineSyntaxError::new(format!(
                    "expected a function name, quoted text, or closing # in literal, found {:?}",
                    found
                )))
            }
        };
        let callback = if spec.is_some() { self.callback()? } else { None };
        self.expect(Token::Marker, "literal")?;
        Ok(Node::Literal { spec, callback })
    }

    fn list(&mut self) -> Result<Node, LineSyntaxError> {
        self.expect(Token::OpenBracket, "list block")?;
        let element = self.expect_name("list block")?;
        let delimiter = self.delimiter("list block")?;
        let callback = self.callback()?;
        self.expect(Token::CloseBracket, "list block")?;
        Ok(Node::List {
            element,
            delimiter,
            callback,
        })
    }

    fn munch(&mut self) -> Result<Node, LineSyntaxError> {
        self.expect(Token::OpenMunch, "munch block")?;
        let element = self.expect_name("munch block")?;
        self.expect(Token::OpenBracket, "munch vocabulary")?;
        let mut vocabulary = Vec::new();
        loop {
            match self.bump() {
                Some(Token::Name(item)) | Some(Token::Number(item)) => vocabulary.push(item),
                Some(Token::Quoted(item)) => vocabulary.push(item),
                found => {
                    return Err(LineSyntaxError::new(format!(
                        "expected a vocabulary item, found {:?}",
                        found
                    )))
                }
            }
            if !self.eat(&Token::Comma) {
                break;
            }
        }
        self.expect(Token::CloseBracket, "munch vocabulary")?;
        let delimiter = self.delimiter("munch block")?;
        let callback = self.callback()?;
        self.expect(Token::CloseBracket, "munch block")?;
        Ok(Node::Munch {
            element,
            vocabulary,
            delimiter,
            callback,
        })
    }

    fn set(&mut self) -> Result<Node, LineSyntaxError> {
        self.expect(Token::OpenSet, "set block")?;
        let element = self.expect_name("set block")?;
        let delimiter = self.delimiter("set block")?;
        let callback = self.callback()?;
        self.expect(Token::CloseBracket, "set block")?;
        Ok(Node::Set {
            element,
            delimiter,
            callback,
        })
    }

    fn hash_pair(&mut self, distribute: bool, open: Token) -> Result<Node, LineSyntaxError> {
        self.expect(open, "pair block")?;
        let reverse = self.eat(&Token::Rev);
        let key = self.key_term()?;
        let value = self.value_term()?;
        let separator = self.expect_quoted("pair block")?;
        let callback = self.callback()?;
        self.expect(Token::CloseBrace, "pair block")?;
        Ok(Node::HashPair {
            reverse,
            distribute,
            key,
            value,
            separator,
            callback,
        })
    }

    fn hash_line(&mut self) -> Result<Node, LineSyntaxError> {
        self.expect(Token::OpenHashLine, "pair-line block")?;
        let reverse = self.eat(&Token::Rev);
        let key = self.key_term()?;
        let value = self.value_term()?;
        let separator = self.expect_quoted("pair-line block")?;
        let item_delimiter = self.delimiter("pair-line block")?;
        let callback = self.callback()?;
        self.expect(Token::CloseBrace, "pair-line block")?;
        Ok(Node::HashLine {
            reverse,
            key,
            value,
            separator,
            item_delimiter,
            callback,
        })
    }

    /// A pair key: a function name or a hashable block (literal, list,
    /// munch, set).
    fn key_term(&mut self) -> Result<Term, LineSyntaxError> {
        match self.peek() {
            Some(Token::Name(_)) => match self.bump() {
                Some(Token::Name(name)) => Ok(Term::Name(name)),
                _ => Err(LineSyntaxError::new("expected a key")),
            },
            Some(Token::Marker)
            | Some(Token::OpenBracket)
            | Some(Token::OpenMunch)
            | Some(Token::OpenSet) => Ok(Term::Block(Box::new(self.block_atom()?))),
            found => Err(LineSyntaxError::new(format!(
                "pair key must be a function name or a hashable block, found {:?}",
                found
            ))),
        }
    }

    /// A pair value: a function name or any block.
    fn value_term(&mut self) -> Result<Term, LineSyntaxError> {
        match self.peek() {
            Some(Token::Name(_)) => match self.bump() {
                Some(Token::Name(name)) => Ok(Term::Name(name)),
                _ => Err(LineSyntaxError::new("expected a value")),
            },
            _ => Ok(Term::Block(Box::new(self.block()?))),
        }
    }

    fn multi(&mut self) -> Result<Node, LineSyntaxError> {
        self.expect(Token::OpenParen, "multi block")?;
        let mut blocks = Vec::new();
        while !matches!(self.peek(), Some(Token::Quoted(_))) {
            if self.peek().is_none() {
                return Err(LineSyntaxError::new(
                    "multi block is missing its quoted delimiter",
                ));
            }
            blocks.push(self.block()?);
        }
        if blocks.is_empty() {
            return Err(LineSyntaxError::new("multi block needs at least one child"));
        }
        let delimiter = self.expect_quoted("multi block")?;
        let callback = self.callback()?;
        self.expect(Token::CloseParen, "multi block")?;
        Ok(Node::Multi {
            blocks,
            delimiter,
            callback,
        })
    }

    fn encapsulated(&mut self) -> Result<Node, LineSyntaxError> {
        self.expect(Token::EncapOpen, "encapsulated block")?;
        let inner = self.block()?;
        let trim = self.expect_name("encapsulated block")?;
        self.expect(Token::EncapClose, "encapsulated block")?;
        Ok(Node::Encapsulated {
            inner: Box::new(inner),
            trim,
        })
    }
}
