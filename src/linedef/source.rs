//! Line sources
//!
//! Stream builders never touch files directly: they read from a
//! [`LineSource`], a forward-only cursor handed explicitly into every
//! `parse` call. This keeps cursor ownership visible at each call site and
//! lets every builder be tested against in-memory line sequences.
//!
//! Lines are right-trimmed on read; trailing whitespace never reaches a
//! combinator. `None` marks end of input.

use std::io::BufRead;

/// The default sentinel: builders terminated by an empty line.
pub const EMPTY_LINE: &str = "";

/// Single-space delimiter, the most common field separator.
pub const SPACE: &str = " ";

/// A forward-only cursor over input lines.
pub trait LineSource {
    /// The next line with trailing whitespace removed, or `None` at end of
    /// input. Advances the cursor.
    fn next_line(&mut self) -> Option<String>;
}

/// An in-memory line source, mainly for tests and small inputs.
pub struct MemorySource {
    lines: std::vec::IntoIter<String>,
}

impl MemorySource {
    /// Split `text` into lines. The final newline, if any, does not produce
    /// a trailing empty line.
    pub fn new(text: &str) -> Self {
        MemorySource {
            lines: text
                .lines()
                .map(|l| l.trim_end().to_string())
                .collect::<Vec<_>>()
                .into_iter(),
        }
    }

    /// Use an explicit sequence of lines.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MemorySource {
            lines: lines
                .into_iter()
                .map(|l| l.into().trim_end().to_string())
                .collect::<Vec<_>>()
                .into_iter(),
        }
    }
}

impl LineSource for MemorySource {
    fn next_line(&mut self) -> Option<String> {
        self.lines.next()
    }
}

/// A line source over any buffered reader (files, stdin).
pub struct ReaderSource<R: BufRead> {
    reader: R,
}

impl<R: BufRead> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        ReaderSource { reader }
    }
}

impl<R: BufRead> LineSource for ReaderSource<R> {
    fn next_line(&mut self) -> Option<String> {
        let mut buf = String::new();
        match self.reader.read_line(&mut buf) {
            Ok(0) => None,
            Ok(_) => Some(buf.trim_end().to_string()),
            // Treat unreadable input as exhausted; builders surface the
            // resulting missing-sentinel condition.
            Err(_) => None,
        }
    }
}
