//! Provider traits for language front ends.
//!
//! The core never parses or lexes source itself. A language plugs in through
//! two narrow seams:
//!
//! - [`TreeProvider`]: source text to a finished [`SyntaxTree`]
//! - [`Lexer`]: source text to typed lexical items with byte offsets
//!
//! Both must be deterministic: the same input always yields the same output.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{LexError, Result, VarScopeError};
use crate::filter::FileFilter;
use crate::tree::SyntaxTree;

// ============================================================================
// Parse Kind
// ============================================================================

/// What a source string is expected to contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParseKind {
    /// A whole source file.
    #[default]
    CompilationUnit,
    /// Members of a class body (fields, methods, nested types).
    ClassBody,
    /// A single method or constructor declaration.
    Method,
    /// A sequence of block statements.
    Statements,
    /// A single expression.
    Expression,
}

impl ParseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseKind::CompilationUnit => "compilation-unit",
            ParseKind::ClassBody => "class-body",
            ParseKind::Method => "method",
            ParseKind::Statements => "statements",
            ParseKind::Expression => "expression",
        }
    }
}

impl fmt::Display for ParseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ParseKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "compilation-unit" => Ok(ParseKind::CompilationUnit),
            "class-body" => Ok(ParseKind::ClassBody),
            "method" => Ok(ParseKind::Method),
            "statements" => Ok(ParseKind::Statements),
            "expression" => Ok(ParseKind::Expression),
            other => Err(format!(
                "unknown parse kind '{}', expected one of: compilation-unit, class-body, method, statements, expression",
                other
            )),
        }
    }
}

// ============================================================================
// Tree Provider
// ============================================================================

/// Parses source text into a [`SyntaxTree`].
pub trait TreeProvider {
    /// Parse `code` as the given kind of snippet.
    ///
    /// Malformed source is reported as [`VarScopeError::Parse`].
    fn parse_str(&self, code: &str, kind: ParseKind) -> Result<SyntaxTree>;

    /// Read and parse a whole file.
    ///
    /// The default implementation reads the file as UTF-8 and parses it as a
    /// compilation unit. I/O failures become [`VarScopeError::InputRead`]
    /// carrying the path.
    fn parse_file(&self, path: &Path) -> Result<SyntaxTree> {
        let code = fs::read_to_string(path).map_err(|e| VarScopeError::input_read(path, e))?;
        self.parse_str(&code, ParseKind::CompilationUnit)
    }
}

// ============================================================================
// Lexer
// ============================================================================

/// One lexical item: text, kind, and byte offset of its first character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexItem {
    pub text: String,
    pub kind: String,
    pub offset: usize,
}

impl LexItem {
    pub fn new(text: impl Into<String>, kind: impl Into<String>, offset: usize) -> Self {
        LexItem {
            text: text.into(),
            kind: kind.into(),
            offset,
        }
    }
}

/// Splits source text into typed lexical items.
///
/// Kinds are dotted strings (`Keyword.Type`, `Literal.Number.Integer`); a
/// kind's prefix names its family.
pub trait Lexer {
    /// Lex `text` into items in source order.
    fn lex(&self, text: &str) -> std::result::Result<Vec<LexItem>, LexError>;

    /// The kind string this lexer assigns to identifiers.
    fn identifier_type(&self) -> &str;

    /// True for items that carry no meaning for consumers (whitespace).
    fn is_program_token(&self, item: &LexItem) -> bool {
        item.kind == "Text" || item.kind.starts_with("Text.")
    }

    /// Files this lexer understands.
    fn file_filter(&self) -> &FileFilter;
}

// ============================================================================
// Tests
// ============================================================================
