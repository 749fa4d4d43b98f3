//! Token definitions for grammar lines
//!
//! One grammar line lexes into a flat token list. Keywords (`or`, `rev`,
//! `None`) win length-ties against names via priority; longer names still
//! win outright, so `organ` is a name and `or` is a keyword.

use logos::Logos;

/// All tokens that can appear in one grammar line.
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(skip r"[ \t]+")]
pub enum Token {
    // Builder group markers
    #[token("((")]
    OpenComposite,
    #[token("[[")]
    OpenList,
    #[token("{{")]
    OpenHash,

    // Fragment block markers
    #[token("[*")]
    OpenMunch,
    #[token("[<")]
    OpenSet,
    #[token("{*")]
    OpenHashLine,
    #[token("{<")]
    OpenDistribute,
    #[token("#")]
    Marker,
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token("[")]
    OpenBracket,
    #[token("]")]
    CloseBracket,
    #[token("{")]
    OpenBrace,
    #[token("}")]
    CloseBrace,
    #[token(">")]
    EncapOpen,
    #[token("<")]
    EncapClose,
    #[token("/")]
    Slash,
    #[token(",")]
    Comma,

    // Keywords
    #[token("or")]
    Or,
    #[token("rev")]
    Rev,
    #[token("None")]
    NoDelimiter,

    /// A quoted string in either quote style, unquoted. May be empty.
    #[regex(r#""[^"]*""#, |lex| unquote(lex.slice()))]
    #[regex(r#"'[^']*'"#, |lex| unquote(lex.slice()))]
    Quoted(String),

    /// A function name or bare vocabulary item.
    #[regex(r"[a-zA-Z][a-zA-Z0-9_.]*", |lex| lex.slice().to_string(), priority = 1)]
    Name(String),

    /// A bare integer, accepted as a vocabulary item.
    #[regex(r"[0-9]+", |lex| lex.slice().to_string(), priority = 1)]
    Number(String),
}

fn unquote(slice: &str) -> String {
    slice[1..slice.len() - 1].to_string()
}

/// Lex one grammar line. Returns the offending text on a lex error.
pub fn tokenize(line: &str) -> Result<Vec<Token>, String> {
    let mut lexer = Token::lexer(line);
    let mut tokens = Vec::new();
    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push(token),
            Err(_) => return Err(lexer.slice().to_string()),
        }
    }
    Ok(tokens)
}
