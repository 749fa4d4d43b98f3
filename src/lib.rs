//! # linedef
//!
//! A declarative parser for line-oriented text formats.
//!
//! A linedef grammar describes the shape of a structured text file
//! (headers, repeated blocks, delimiter-separated fields, key:value pairs)
//! and the compiler turns it into a tree of fragment combinators and stream
//! builders that parse the file into one nested value.
//!
//! ## Testing
//!
//! Library tests run against in-memory line sources (see the
//! [testing module](linedef::testing)); no file I/O is required to exercise
//! any builder or combinator.

pub mod linedef;
