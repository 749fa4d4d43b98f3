//! Test support
//!
//! Small helpers shared by the unit and integration tests. Everything runs
//! against in-memory line sources; no test needs to touch the filesystem.

use crate::linedef::blocks::Block;
use crate::linedef::funcs::Registry;
use crate::linedef::source::MemorySource;

/// An in-memory line source over `text`.
pub fn source(text: &str) -> MemorySource {
    MemorySource::new(text)
}

/// A literal block applying the builtin `int` conversion.
pub fn int_block() -> Block {
    Block::Literal {
        func: Registry::new().get("int").expect("builtin int"),
    }
}

/// A literal block applying the builtin `str` identity.
pub fn text_block() -> Block {
    Block::Literal {
        func: Registry::new().get("str").expect("builtin str"),
    }
}
