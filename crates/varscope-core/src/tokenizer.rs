//! Positioned code tokenizer.
//!
//! Wraps a [`Lexer`] and produces the canonical token stream:
//!
//! 1. lex the source into (text, kind, offset) items
//! 2. drop program tokens (whitespace, and whatever else the lexer says)
//! 3. trim the text of each retained item, keeping its kind verbatim
//! 4. bracket the result with `<SENTENCE_START>` and `<SENTENCE_END/>`
//!
//! Positioned output is keyed by [`TokenPos`], so the start sentinel always
//! sorts first and the end sentinel last, even for a token at byte 0.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::Result;
use crate::filter::FileFilter;
use crate::model::{Token, TokenPos};
use crate::provider::Lexer;

/// Tokens keyed by the byte offset at which they start.
pub type PositionedTokens = BTreeMap<TokenPos, Token>;

/// Tokenizer over a language lexer.
#[derive(Debug, Clone)]
pub struct CodeTokenizer<L> {
    lexer: L,
}

impl<L: Lexer> CodeTokenizer<L> {
    pub fn new(lexer: L) -> Self {
        CodeTokenizer { lexer }
    }

    /// The wrapped lexer.
    pub fn lexer(&self) -> &L {
        &self.lexer
    }

    /// Retained (offset, token) pairs in source order, without sentinels.
    fn retained(&self, code: &str) -> Result<Vec<(usize, Token)>> {
        let items = self.lexer.lex(code)?;
        let lexed = items.len();
        let tokens: Vec<(usize, Token)> = items
            .into_iter()
            .filter(|item| !self.lexer.is_program_token(item))
            .map(|item| (item.offset, Token::new(item.text.trim(), item.kind)))
            .collect();
        debug!(bytes = code.len(), lexed, retained = tokens.len(), "tokenized");
        Ok(tokens)
    }

    /// Tokens keyed by start offset, bracketed by sentinels.
    pub fn full_token_list_with_pos(&self, code: &str) -> Result<PositionedTokens> {
        let mut positioned = PositionedTokens::new();
        positioned.insert(TokenPos::Start, Token::sentence_start());
        for (offset, token) in self.retained(code)? {
            positioned.insert(TokenPos::At(offset), token);
        }
        positioned.insert(TokenPos::End, Token::sentence_end());
        Ok(positioned)
    }

    /// Tokens in source order, bracketed by sentinels.
    pub fn token_list_from_code(&self, code: &str) -> Result<Vec<Token>> {
        let retained = self.retained(code)?;
        let mut tokens = Vec::with_capacity(retained.len() + 2);
        tokens.push(Token::sentence_start());
        tokens.extend(retained.into_iter().map(|(_, token)| token));
        tokens.push(Token::sentence_end());
        Ok(tokens)
    }

    /// Token texts in source order, sentinels included.
    pub fn token_texts(&self, code: &str) -> Result<Vec<String>> {
        Ok(self
            .token_list_from_code(code)?
            .into_iter()
            .map(|token| token.text)
            .collect())
    }

    /// Token texts keyed by start offset, sentinels included.
    pub fn token_texts_with_pos(&self, code: &str) -> Result<BTreeMap<TokenPos, String>> {
        Ok(self
            .full_token_list_with_pos(code)?
            .into_iter()
            .map(|(pos, token)| (pos, token.text))
            .collect())
    }

    /// The kind the lexer assigns to identifiers.
    pub fn identifier_type(&self) -> &str {
        self.lexer.identifier_type()
    }

    /// Tokenize a single token's text and return the first real token.
    ///
    /// Text that lexes to nothing yields the end sentinel.
    pub fn token_from_string(&self, token: &str) -> Result<Token> {
        let tokens = self.token_list_from_code(token)?;
        Ok(tokens
            .into_iter()
            .nth(1)
            .unwrap_or_else(Token::sentence_end))
    }

    /// Files the wrapped lexer understands.
    pub fn file_filter(&self) -> &FileFilter {
        self.lexer.file_filter()
    }
}

// ============================================================================
// Tests
// ============================================================================
