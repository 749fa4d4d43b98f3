//! Tagged syntax nodes: the engine/compiler contract
//!
//! One grammar line becomes one `Node`. Fragment forms may nest other
//! fragment forms in their payloads (a multi-block's children, a pair's key
//! and value); builder markers never nest inside a payload, they are whole
//! lines of their own.

/// Which builder group a marker opens or closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    Composite,
    List,
    Hash,
}

impl GroupKind {
    pub fn name(&self) -> &'static str {
        match self {
            GroupKind::Composite => "composite",
            GroupKind::List => "list",
            GroupKind::Hash => "hash",
        }
    }
}

/// What a literal block does with its fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralSpec {
    /// Apply the named function.
    Func(String),
    /// Insist the fragment equals this text, produce nothing.
    Exact(String),
}

/// A payload position that accepts either a bare function name or a nested
/// block.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Name(String),
    Block(Box<Node>),
}

/// One matched grammar line (or nested fragment payload).
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// `#fn#`, `#'text'#`, `##`, each with an optional `/callback`
    Literal {
        spec: Option<LiteralSpec>,
        callback: Option<String>,
    },
    /// `[fn 'delim']`; a `None` delimiter means single characters
    List {
        element: String,
        delimiter: Option<String>,
        callback: Option<String>,
    },
    /// `[* fn [item, ...] 'delim']`, greedy vocabulary tokenization
    Munch {
        element: String,
        vocabulary: Vec<String>,
        delimiter: Option<String>,
        callback: Option<String>,
    },
    /// `[< fn 'delim']`, like a list but materialized as a set
    Set {
        element: String,
        delimiter: Option<String>,
        callback: Option<String>,
    },
    /// `{ [rev] key value 'sep' }` and the `{<` distribute form
    HashPair {
        reverse: bool,
        distribute: bool,
        key: Term,
        value: Term,
        separator: String,
        callback: Option<String>,
    },
    /// `{* [rev] key value 'pairsep' 'itemdelim' }`
    HashLine {
        reverse: bool,
        key: Term,
        value: Term,
        separator: String,
        item_delimiter: Option<String>,
        callback: Option<String>,
    },
    /// `( block+ 'delim' )`
    Multi {
        blocks: Vec<Node>,
        delimiter: String,
        callback: Option<String>,
    },
    /// `block or block [or block ...]`
    Or { alternatives: Vec<Node> },
    /// `> block fn <`
    Encapsulated { inner: Box<Node>, trim: String },
    /// `((`, `[[`, `{{` alone on a line
    Open(GroupKind),
    /// `)`, `]`, `}` with optional sentinel, `/callback`, and a tolerated
    /// doubled marker
    Close {
        kind: GroupKind,
        sentinel: Option<String>,
        callback: Option<String>,
    },
}
