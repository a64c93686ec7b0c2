//! Error types and error code constants for varscope.
//!
//! This module provides a unified error type (`VarScopeError`) covering every
//! failure the core can surface: unreadable input, parse failures reported by
//! a tree provider, lex failures reported by a lexer, and malformed node shapes
//! offered to the tree builder.
//!
//! ## Error Code Mapping
//!
//! Exit codes used by the CLI:
//! - `2`: Invalid arguments (bad input from caller, unusable configuration)
//! - `3`: Input unavailable (file cannot be read)
//! - `4`: Parse failed (malformed source at the tree provider)
//! - `5`: Lex failed (malformed source at the lexer)
//! - `10`: Internal errors (provider contract violations)
//!
//! ## Propagation
//!
//! Nothing in the core recovers locally. Collaborator errors are wrapped once,
//! keeping the original cause reachable through `std::error::Error::source`.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output and CLI exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad input, unusable configuration).
    InvalidArguments = 2,
    /// The input file could not be read.
    InputUnavailable = 3,
    /// The tree provider rejected the source.
    ParseFailed = 4,
    /// The lexer rejected the source.
    LexFailed = 5,
    /// Internal errors (provider contract violations).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Lex Error
// ============================================================================

/// A failure reported by a lexer while splitting source into lexical items.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (at byte {offset})")]
pub struct LexError {
    /// Byte offset where lexing stopped.
    pub offset: usize,
    /// Human-readable reason.
    pub message: String,
}

impl LexError {
    pub fn new(offset: usize, message: impl Into<String>) -> Self {
        LexError {
            offset,
            message: message.into(),
        }
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for scope extraction and tokenization.
#[derive(Debug, Error)]
pub enum VarScopeError {
    /// The input file could not be opened or read.
    #[error("failed to read {}: {source}", path.display())]
    InputRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The tree provider could not parse the source.
    #[error("parse error at byte {offset}: {message}")]
    Parse { offset: usize, message: String },

    /// The lexer could not tokenize the source.
    #[error("lex error: {0}")]
    Lex(#[from] LexError),

    /// A provider offered a declaration node whose shape is malformed.
    #[error("malformed {kind} node: {reason}")]
    ShapeMismatch { kind: String, reason: String },

    /// No provider or lexer exists for the requested language selector.
    #[error("unsupported language: {suffix}")]
    UnsupportedLanguage { suffix: String },

    /// Configuration could not be loaded.
    #[error("config error: {message}")]
    Config { message: String },
}

/// Convenient alias for results in this crate.
pub type Result<T, E = VarScopeError> = std::result::Result<T, E>;

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&VarScopeError> for OutputErrorCode {
    fn from(err: &VarScopeError) -> Self {
        match err {
            VarScopeError::InputRead { .. } => OutputErrorCode::InputUnavailable,
            VarScopeError::Parse { .. } => OutputErrorCode::ParseFailed,
            VarScopeError::Lex(_) => OutputErrorCode::LexFailed,
            VarScopeError::ShapeMismatch { .. } => OutputErrorCode::InternalError,
            VarScopeError::UnsupportedLanguage { .. } => OutputErrorCode::InvalidArguments,
            VarScopeError::Config { .. } => OutputErrorCode::InvalidArguments,
        }
    }
}

impl From<VarScopeError> for OutputErrorCode {
    fn from(err: VarScopeError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl VarScopeError {
    /// Create an input-read error for `path`.
    pub fn input_read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        VarScopeError::InputRead {
            path: path.into(),
            source,
        }
    }

    /// Create a parse error.
    pub fn parse(offset: usize, message: impl Into<String>) -> Self {
        VarScopeError::Parse {
            offset,
            message: message.into(),
        }
    }

    /// Create a shape-mismatch error for a node of kind `kind`.
    pub fn shape_mismatch(kind: impl Into<String>, reason: impl Into<String>) -> Self {
        VarScopeError::ShapeMismatch {
            kind: kind.into(),
            reason: reason.into(),
        }
    }

    /// Create an unsupported-language error.
    pub fn unsupported_language(suffix: impl Into<String>) -> Self {
        VarScopeError::UnsupportedLanguage {
            suffix: suffix.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        VarScopeError::Config {
            message: message.into(),
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

// ============================================================================
// Tests
// ============================================================================
