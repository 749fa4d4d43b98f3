//! Error types for grammar compilation and runtime parsing
//!
//! Compile-time problems (bad grammar lines, unknown function names, arity
//! violations) are `CompileError`s and always carry the offending grammar
//! line. Runtime problems are `ParseError`s; only `Or` recovers from them,
//! and only for its own alternatives.

use std::fmt;

/// Errors raised while parsing input lines with a compiled or hand-built
/// definition.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// A scalar function or combinator rejected its fragment
    Fragment { fragment: String, message: String },
    /// Every alternative of an `Or` combinator failed
    NoAlternative { fragment: String },
    /// A pair fragment did not split into exactly two parts on its separator
    PairShape { fragment: String, separator: String },
    /// A distribute pair's parsed key was not a list or set
    DistributeKey { fragment: String },
    /// A trim function produced something other than text
    TrimNotText { fragment: String },
    /// A hash builder iteration produced something other than a mapping
    NotAMapping { line: String },
    /// End of input was reached while a builder was still waiting for its
    /// sentinel line. The empty-line sentinel is satisfied by end of input;
    /// any other sentinel must actually appear.
    MissingSentinel { sentinel: String },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Fragment { fragment, message } => {
                write!(f, "cannot parse fragment \"{}\": {}", fragment, message)
            }
            ParseError::NoAlternative { fragment } => {
                write!(f, "no alternative matched for fragment \"{}\"", fragment)
            }
            ParseError::PairShape {
                fragment,
                separator,
            } => write!(
                f,
                "expected exactly one \"{}\" in pair fragment \"{}\"",
                separator, fragment
            ),
            ParseError::DistributeKey { fragment } => write!(
                f,
                "distribute requires a list or set key, got none in \"{}\"",
                fragment
            ),
            ParseError::TrimNotText { fragment } => {
                write!(f, "trim of fragment \"{}\" must produce text", fragment)
            }
            ParseError::NotAMapping { line } => {
                write!(f, "hash builder line \"{}\" did not produce a mapping", line)
            }
            ParseError::MissingSentinel { sentinel } => write!(
                f,
                "end of input reached while waiting for sentinel \"{}\"",
                sentinel
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// Errors raised while compiling grammar text into a definition.
///
/// Every variant names the grammar line it came from (1-indexed), so a bad
/// definition can be fixed without guessing.
#[derive(Debug, Clone, PartialEq)]
pub enum CompileError {
    /// The grammar engine could not match the line against any known form
    Syntax {
        line_no: usize,
        line: String,
        message: String,
    },
    /// A function name is not present in the registry
    UnknownFunction { line_no: usize, name: String },
    /// A builder was given more or fewer children than it allows
    Arity {
        line_no: usize,
        builder: &'static str,
        message: String,
    },
    /// A hash builder's child is not a pair or pair-line form
    HashChild { line_no: usize },
    /// A close marker appeared with no matching open, or closed the wrong
    /// builder kind
    MismatchedClose { line_no: usize, line: String },
    /// The grammar ended while a builder was still open
    UnterminatedBuilder { line_no: usize, builder: &'static str },
}

impl CompileError {
    /// The grammar line the error points at (1-indexed).
    pub fn line_no(&self) -> usize {
        match self {
            CompileError::Syntax { line_no, .. }
            | CompileError::UnknownFunction { line_no, .. }
            | CompileError::Arity { line_no, .. }
            | CompileError::HashChild { line_no }
            | CompileError::MismatchedClose { line_no, .. }
            | CompileError::UnterminatedBuilder { line_no, .. } => *line_no,
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Syntax {
                line_no,
                line,
                message,
            } => write!(f, "line {}: bad grammar line \"{}\": {}", line_no, line, message),
            CompileError::UnknownFunction { line_no, name } => {
                write!(f, "line {}: unknown function \"{}\"", line_no, name)
            }
            CompileError::Arity {
                line_no,
                builder,
                message,
            } => write!(f, "line {}: {} builder {}", line_no, builder, message),
            CompileError::HashChild { line_no } => write!(
                f,
                "line {}: hash builder needs a pair or pair-line fragment",
                line_no
            ),
            CompileError::MismatchedClose { line_no, line } => {
                write!(f, "line {}: close marker \"{}\" has no matching open", line_no, line)
            }
            CompileError::UnterminatedBuilder { line_no, builder } => write!(
                f,
                "line {}: {} builder is never closed",
                line_no, builder
            ),
        }
    }
}

impl std::error::Error for CompileError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::Fragment {
            fragment: "abc".to_string(),
            message: "invalid integer".to_string(),
        };
        assert_eq!(err.to_string(), "cannot parse fragment \"abc\": invalid integer");

        let err = ParseError::MissingSentinel {
            sentinel: "END".to_string(),
        };
        assert!(err.to_string().contains("END"));
    }

    #[test]
    fn test_compile_error_line_no() {
        let err = CompileError::UnknownFunction {
            line_no: 4,
            name: "frobnicate".to_string(),
        };
        assert_eq!(err.line_no(), 4);
        assert!(err.to_string().starts_with("line 4:"));
    }
}
