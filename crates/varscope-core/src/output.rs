//! JSON output types and serialization for CLI responses.
//!
//! Every response has `status` as its first field and carries
//! `schema_version`. Field order and array order are deterministic: scope
//! records come out in key order, nodes in arena order, tokens in source
//! order.

use std::io::{self, Write};

use serde::Serialize;

use crate::bag::VariableBag;
use crate::error::{OutputErrorCode, VarScopeError};
use crate::extract::{ExtractionStats, ScopeAnalysis};
use crate::model::{Token, TokenPos};
use crate::snippets::ScopeSnippets;
use crate::tokenizer::PositionedTokens;
use crate::tree::{NodeId, Span};

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Error Types
// ============================================================================

/// Error information for error responses.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    /// Numeric error code (same as the process exit code).
    pub code: u8,
    /// Human-readable message.
    pub message: String,
    /// Error-specific structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorInfo {
    /// Create from a VarScopeError.
    pub fn from_error(err: &VarScopeError) -> Self {
        let code = OutputErrorCode::from(err).code();
        let message = err.to_string();
        let details = match err {
            VarScopeError::InputRead { path, .. } => {
                Some(serde_json::json!({ "path": path.display().to_string() }))
            }
            VarScopeError::Parse { offset, .. } => Some(serde_json::json!({ "offset": offset })),
            VarScopeError::Lex(lex) => Some(serde_json::json!({ "offset": lex.offset })),
            VarScopeError::ShapeMismatch { kind, .. } => Some(serde_json::json!({ "kind": kind })),
            VarScopeError::UnsupportedLanguage { suffix } => {
                Some(serde_json::json!({ "language": suffix }))
            }
            VarScopeError::Config { .. } => None,
        };
        ErrorInfo {
            code,
            message,
            details,
        }
    }
}

/// Error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Error information.
    pub error: ErrorInfo,
}

impl ErrorResponse {
    /// Create an error response from a VarScopeError.
    pub fn from_error(err: &VarScopeError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }

    /// Create an error response with just code and message.
    pub fn new(code: OutputErrorCode, message: impl Into<String>) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo {
                code: code.code(),
                message: message.into(),
                details: None,
            },
        }
    }
}

// ============================================================================
// Response Structs
// ============================================================================

/// Response for the `scopes` command.
#[derive(Debug, Clone, Serialize)]
pub struct ScopesResponse {
    pub status: String,
    pub schema_version: String,
    /// Input path, or `<code>` for inline source.
    pub source: String,
    pub stats: ExtractionStats,
    pub scopes: ScopeSnippets,
}

impl ScopesResponse {
    pub fn new(source: impl Into<String>, stats: ExtractionStats, scopes: ScopeSnippets) -> Self {
        ScopesResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            source: source.into(),
            stats,
            scopes,
        }
    }
}

/// Variables visible at one node.
#[derive(Debug, Clone, Serialize)]
pub struct VisibleNode {
    pub node: NodeId,
    pub kind: String,
    pub span: Span,
    pub visible: VariableBag,
}

/// Response for the `visible` command.
#[derive(Debug, Clone, Serialize)]
pub struct VisibleResponse {
    pub status: String,
    pub schema_version: String,
    pub source: String,
    pub stats: ExtractionStats,
    /// Nodes that see at least one variable, in arena order.
    pub nodes: Vec<VisibleNode>,
}

impl VisibleResponse {
    pub fn from_analysis(source: impl Into<String>, analysis: &ScopeAnalysis) -> Self {
        let tree = analysis.tree();
        let nodes = analysis
            .visibility()
            .iter()
            .filter(|(_, bag)| !bag.is_empty())
            .map(|(id, bag)| VisibleNode {
                node: id,
                kind: tree.kind(id).name.to_string(),
                span: tree.node(id).span(),
                visible: bag.clone(),
            })
            .collect();
        VisibleResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            source: source.into(),
            stats: analysis.stats(),
            nodes,
        }
    }
}

/// One token in a `tokens` response.
#[derive(Debug, Clone, Serialize)]
pub struct TokenEntry {
    /// Start offset; -1 for the start sentinel, `i64::MAX` for the end one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos: Option<TokenPos>,
    pub text: String,
    pub kind: String,
}

/// Response for the `tokens` command.
#[derive(Debug, Clone, Serialize)]
pub struct TokensResponse {
    pub status: String,
    pub schema_version: String,
    pub source: String,
    pub count: usize,
    pub tokens: Vec<TokenEntry>,
}

impl TokensResponse {
    /// Tokens without positions.
    pub fn from_list(source: impl Into<String>, tokens: Vec<Token>) -> Self {
        let tokens: Vec<TokenEntry> = tokens
            .into_iter()
            .map(|token| TokenEntry {
                pos: None,
                text: token.text,
                kind: token.kind,
            })
            .collect();
        Self::with_entries(source.into(), tokens)
    }

    /// Tokens with their positions.
    pub fn from_positioned(source: impl Into<String>, tokens: PositionedTokens) -> Self {
        let tokens: Vec<TokenEntry> = tokens
            .into_iter()
            .map(|(pos, token)| TokenEntry {
                pos: Some(pos),
                text: token.text,
                kind: token.kind,
            })
            .collect();
        Self::with_entries(source.into(), tokens)
    }

    fn with_entries(source: String, tokens: Vec<TokenEntry>) -> Self {
        TokensResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            source,
            count: tokens.len(),
            tokens,
        }
    }
}

/// Response for the `token` command.
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub status: String,
    pub schema_version: String,
    pub token: Token,
    /// True if the token's kind is the lexer's identifier kind.
    pub identifier: bool,
}

impl TokenResponse {
    pub fn new(token: Token, identifier_type: &str) -> Self {
        let identifier = token.kind == identifier_type;
        TokenResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            token,
            identifier,
        }
    }
}

/// Response for the `identifier-type` command.
#[derive(Debug, Clone, Serialize)]
pub struct IdentifierTypeResponse {
    pub status: String,
    pub schema_version: String,
    pub language: String,
    pub identifier_type: String,
}

impl IdentifierTypeResponse {
    pub fn new(language: impl Into<String>, identifier_type: impl Into<String>) -> Self {
        IdentifierTypeResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            language: language.into(),
            identifier_type: identifier_type.into(),
        }
    }
}

// ============================================================================
// Emitters
// ============================================================================

/// Emit a response as pretty-printed JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

/// Emit a response as compact JSON (single line) to a writer.
pub fn emit_response_compact<T: Serialize>(
    response: &T,
    writer: &mut impl Write,
) -> io::Result<()> {
    let json = serde_json::to_string(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LexError;
    use crate::snippets::SnippetGrouping;
    use crate::testing::ClassFixture;

    mod error_response {
        use super::*;

        #[test]
        fn input_read_carries_path() {
            let err = VarScopeError::input_read(
                "Missing.java",
                io::Error::new(io::ErrorKind::NotFound, "no such file"),
            );
            let json = serde_json::to_value(ErrorResponse::from_error(&err)).unwrap();
            assert_eq!(json["status"], "error");
            assert_eq!(json["schema_version"], SCHEMA_VERSION);
            assert_eq!(json["error"]["code"], 3);
            assert_eq!(json["error"]["details"]["path"], "Missing.java");
        }

        #[test]
        fn lex_error_carries_offset() {
            let err = VarScopeError::from(LexError::new(17, "unterminated string"));
            let info = ErrorInfo::from_error(&err);
            assert_eq!(info.code, 5);
            assert_eq!(info.details, Some(serde_json::json!({ "offset": 17 })));
        }

        #[test]
        fn config_error_has_no_details() {
            let json =
                serde_json::to_value(ErrorResponse::from_error(&VarScopeError::config("bad")))
                    .unwrap();
            assert!(json["error"].get("details").is_none());
        }

        #[test]
        fn new_uses_given_code() {
            let response = ErrorResponse::new(OutputErrorCode::InvalidArguments, "no input");
            assert_eq!(response.error.code, 2);
            assert_eq!(response.error.message, "no input");
        }
    }

    mod responses {
        use super::*;

        #[test]
        fn scopes_response_lists_records() {
            let analysis = ScopeAnalysis::of_tree(ClassFixture::build().tree);
            let response = ScopesResponse::new(
                "A.java",
                analysis.stats(),
                analysis.snippets(SnippetGrouping::Textual),
            );
            let json = serde_json::to_value(&response).unwrap();
            assert_eq!(json["status"], "ok");
            assert_eq!(json["source"], "A.java");
            assert_eq!(json["stats"]["declarations"], 3);
            assert_eq!(json["scopes"].as_array().unwrap().len(), 3);
        }

        #[test]
        fn visible_response_skips_empty_nodes() {
            let fx = ClassFixture::build();
            let analysis = ScopeAnalysis::of_tree(fx.tree);
            let response = VisibleResponse::from_analysis("<code>", &analysis);
            // Every node but the class declaration root sees something.
            assert_eq!(response.nodes.len(), analysis.tree().len() - 1);
            let body = response
                .nodes
                .iter()
                .find(|n| n.node == fx.method_body)
                .unwrap();
            assert_eq!(body.kind, "block");
            assert_eq!(body.visible.len(), 3);
        }

        #[test]
        fn token_entries_include_positions_only_when_asked() {
            let mut positioned = PositionedTokens::new();
            positioned.insert(TokenPos::Start, Token::sentence_start());
            positioned.insert(TokenPos::At(0), Token::new("x", "Name"));
            positioned.insert(TokenPos::End, Token::sentence_end());

            let with_pos = serde_json::to_value(TokensResponse::from_positioned(
                "<code>",
                positioned.clone(),
            ))
            .unwrap();
            assert_eq!(with_pos["count"], 3);
            assert_eq!(with_pos["tokens"][0]["pos"], -1);
            assert_eq!(with_pos["tokens"][1]["pos"], 0);
            assert_eq!(with_pos["tokens"][2]["pos"], i64::MAX);

            let list: Vec<Token> = positioned.into_values().collect();
            let without = serde_json::to_value(TokensResponse::from_list("<code>", list)).unwrap();
            assert!(without["tokens"][1].get("pos").is_none());
            assert_eq!(without["tokens"][1]["text"], "x");
        }

        #[test]
        fn token_response_flags_identifiers() {
            assert!(TokenResponse::new(Token::new("foo", "Name"), "Name").identifier);
            assert!(!TokenResponse::new(Token::new("int", "Keyword.Type"), "Name").identifier);
            let json = serde_json::to_value(IdentifierTypeResponse::new("java", "Name")).unwrap();
            assert_eq!(json["identifier_type"], "Name");
        }
    }

    mod emit {
        use super::*;

        #[test]
        fn pretty_and_compact_are_equivalent() {
            let response = IdentifierTypeResponse::new("java", "Name");
            let mut pretty = Vec::new();
            emit_response(&response, &mut pretty).unwrap();
            let mut compact = Vec::new();
            emit_response_compact(&response, &mut compact).unwrap();

            let compact = String::from_utf8(compact).unwrap();
            assert_eq!(compact.lines().count(), 1);
            let a: serde_json::Value = serde_json::from_slice(&pretty).unwrap();
            let b: serde_json::Value = serde_json::from_str(&compact).unwrap();
            assert_eq!(a, b);
            // status first
            assert!(compact.starts_with("{\"status\":\"ok\""));
        }
    }
}
