//! Value types shared by scope extraction and tokenization.
//!
//! - [`ScopeKind`]: the lexical level a declaration belongs to
//! - [`Variable`]: a declared (name, type, scope kind) triple
//! - [`ScopeKey`]: the grouping identity used for scope snippets
//! - [`Token`] and [`TokenPos`]: the typed token stream and its ordered keys
//!
//! All types here are immutable values with total, derived orderings so that
//! every map keyed by them iterates deterministically.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tree::NodeId;

// ============================================================================
// Scope Kind
// ============================================================================

/// The lexical level at which a variable is declared.
///
/// The declaration order of the variants is the comparison order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    /// A field of a class (or interface constant).
    Class,
    /// A formal parameter of a method or constructor.
    Method,
    /// A local variable, loop/catch binding, or resource.
    Local,
}

impl ScopeKind {
    /// Returns the string representation used in output.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeKind::Class => "class",
            ScopeKind::Method => "method",
            ScopeKind::Local => "local",
        }
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Variable
// ============================================================================

/// A declared variable.
///
/// Two variables are equal iff name, declared type and scope kind are all
/// equal. Ordering compares name, then declared type, then scope kind.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    #[serde(rename = "type")]
    pub declared_type: String,
    pub scope: ScopeKind,
}

impl Variable {
    pub fn new(
        name: impl Into<String>,
        declared_type: impl Into<String>,
        scope: ScopeKind,
    ) -> Self {
        Variable {
            name: name.into(),
            declared_type: declared_type.into(),
            scope,
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}) at {}", self.name, self.declared_type, self.scope)
    }
}

// ============================================================================
// Scope Key
// ============================================================================

/// Grouping identity for "the same logical scope".
///
/// Field order is comparison order. `node` is only set when grouping per node
/// (see [`SnippetGrouping`](crate::snippets::SnippetGrouping)); under textual
/// grouping two nodes with the same rendering, scope kind, declared type and
/// kind codes share one key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ScopeKey {
    /// Canonical textual rendering of the owning node.
    pub snippet: String,
    pub scope: ScopeKind,
    #[serde(rename = "type")]
    pub declared_type: String,
    /// Kind code of the owning node.
    pub node_kind: i32,
    /// Kind code of the owning node's parent, or -1 when it has none.
    pub parent_kind: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<NodeId>,
}

// ============================================================================
// Tokens
// ============================================================================

/// Text of the synthetic token opening every token stream.
pub const SENTENCE_START: &str = "<SENTENCE_START>";

/// Text of the synthetic token closing every token stream.
pub const SENTENCE_END: &str = "<SENTENCE_END/>";

/// A typed lexical token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub kind: String,
}

impl Token {
    pub fn new(text: impl Into<String>, kind: impl Into<String>) -> Self {
        Token {
            text: text.into(),
            kind: kind.into(),
        }
    }

    /// The stream-start sentinel. Its kind equals its text.
    pub fn sentence_start() -> Self {
        Token::new(SENTENCE_START, SENTENCE_START)
    }

    /// The stream-end sentinel. Its kind equals its text.
    pub fn sentence_end() -> Self {
        Token::new(SENTENCE_END, SENTENCE_END)
    }

    /// Returns true for either sentinel.
    pub fn is_sentinel(&self) -> bool {
        (self.text == SENTENCE_START && self.kind == SENTENCE_START)
            || (self.text == SENTENCE_END && self.kind == SENTENCE_END)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.text, self.kind)
    }
}

/// Key of a token in a positioned token map.
///
/// `Start` sorts before every real offset and `End` after every real offset,
/// so sentinels can never collide with a token starting at byte 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TokenPos {
    Start,
    At(usize),
    End,
}

impl TokenPos {
    /// Integer rendering: -1 for `Start`, the offset for `At`, `i64::MAX` for `End`.
    pub fn as_i64(&self) -> i64 {
        match self {
            TokenPos::Start => -1,
            TokenPos::At(offset) => i64::try_from(*offset).unwrap_or(i64::MAX - 1),
            TokenPos::End => i64::MAX,
        }
    }
}

impl fmt::Display for TokenPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i64())
    }
}

impl Serialize for TokenPos {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.as_i64())
    }
}

// ============================================================================
// Tests
// ============================================================================
