// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Java lexer.
//!
//! An ordered list of anchored regex rules; at each position the first rule
//! that matches wins. Kinds follow the Pygments naming scheme:
//!
//! | Kind                       | Examples                        |
//! |----------------------------|---------------------------------|
//! | `Text`                     | whitespace                      |
//! | `Comment.Single`           | `// ...`                        |
//! | `Comment.Multiline`        | `/* ... */`, `/** ... */`       |
//! | `Literal.String`           | `"abc"`, `"""text block"""`     |
//! | `Literal.String.Char`      | `'a'`, `'\n'`                   |
//! | `Literal.Number.*`         | `0x1F`, `0b101`, `1.5e3f`, `017`, `42L` |
//! | `Name.Decorator`           | `@Override`                     |
//! | `Keyword`, `Keyword.*`     | `if`, `int`, `public`, `true`   |
//! | `Name`                     | identifiers                     |
//! | `Operator`, `Punctuation`  | `+=`, `->`, `{`, `;`            |
//!
//! Whitespace is always a program token; comments are program tokens unless
//! the lexer is built with [`JavaLexer::with_comments`].

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use varscope_core::error::{LexError, Result, VarScopeError};
use varscope_core::filter::FileFilter;
use varscope_core::provider::{LexItem, Lexer};

/// Kind assigned to identifiers.
pub const IDENTIFIER_KIND: &str = "Name";

static JAVA_FILES: LazyLock<FileFilter> =
    LazyLock::new(|| FileFilter::for_extensions(&["java"]).unwrap());

static RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"\A\s+", "Text"),
        (r"\A//[^\n]*", "Comment.Single"),
        (r"\A/\*[\s\S]*?\*/", "Comment.Multiline"),
        (r#"\A"""[\s\S]*?""""#, "Literal.String"),
        (r#"\A"(?:[^"\\\n]|\\.)*""#, "Literal.String"),
        (r"\A'(?:[^'\\\n]|\\[^\n]+?)'", "Literal.String.Char"),
        (r"\A@[^\W\d][\w.]*", "Name.Decorator"),
        (r"\A0[xX][0-9a-fA-F][0-9a-fA-F_]*[lL]?", "Literal.Number.Hex"),
        (r"\A0[bB][01][01_]*[lL]?", "Literal.Number.Bin"),
        (
            r"\A(?:(?:[0-9][0-9_]*\.[0-9_]*|\.[0-9][0-9_]*)(?:[eE][+-]?[0-9]+)?[fFdD]?|[0-9][0-9_]*(?:[eE][+-]?[0-9]+[fFdD]?|[fFdD]))",
            "Literal.Number.Float",
        ),
        (r"\A0[0-7_]+[lL]?", "Literal.Number.Oct"),
        (r"\A(?:0|[1-9][0-9_]*)[lL]?", "Literal.Number.Integer"),
        (r"\A(?:package|import)\b", "Keyword.Namespace"),
        (r"\A(?:true|false|null)\b", "Keyword.Constant"),
        (
            r"\A(?:boolean|byte|char|double|float|int|long|short|void)\b",
            "Keyword.Type",
        ),
        (
            r"\A(?:abstract|class|const|enum|extends|final|implements|interface|native|private|protected|public|static|strictfp|super|synchronized|throws|transient|volatile)\b",
            "Keyword.Declaration",
        ),
        (
            r"\A(?:assert|break|case|catch|continue|default|do|else|finally|for|goto|if|instanceof|new|return|switch|this|throw|try|while)\b",
            "Keyword",
        ),
        (r"\A[\p{L}_$][\p{L}\p{N}_$]*", IDENTIFIER_KIND),
        (r"\A(?:\.\.\.|::|[{}()\[\];,.])", "Punctuation"),
        (
            r"\A(?:>>>=|<<=|>>=|>>>|->|\+\+|--|&&|\|\||==|!=|<=|>=|\+=|-=|\*=|/=|&=|\|=|\^=|%=|<<|>>|[=<>!~?:+\-*/&|^%])",
            "Operator",
        ),
    ]
    .into_iter()
    .map(|(pattern, kind)| (Regex::new(pattern).unwrap(), kind))
    .collect()
});

/// Lexer for Java source.
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaLexer {
    keep_comments: bool,
}

impl JavaLexer {
    /// A lexer that treats comments as program tokens.
    pub fn new() -> Self {
        JavaLexer {
            keep_comments: false,
        }
    }

    /// A lexer that keeps comments in the token stream.
    pub fn with_comments() -> Self {
        JavaLexer {
            keep_comments: true,
        }
    }

    pub fn keeps_comments(&self) -> bool {
        self.keep_comments
    }
}

impl Lexer for JavaLexer {
    fn lex(&self, text: &str) -> std::result::Result<Vec<LexItem>, LexError> {
        let mut items = Vec::new();
        let mut pos = 0;
        while pos < text.len() {
            let rest = &text[pos..];
            let Some((len, kind)) = RULES
                .iter()
                .find_map(|(re, kind)| re.find(rest).map(|m| (m.end(), *kind)))
            else {
                return Err(unmatched(rest, pos));
            };
            // An unclosed comment or text block would otherwise lex as `/` or `""`.
            if (kind == "Operator" && rest.starts_with("/*"))
                || (len == 2 && rest.starts_with("\"\"\""))
            {
                return Err(unmatched(rest, pos));
            }
            items.push(LexItem::new(&rest[..len], kind, pos));
            pos += len;
        }
        trace!(items = items.len(), "lexed java");
        Ok(items)
    }

    fn identifier_type(&self) -> &str {
        IDENTIFIER_KIND
    }

    fn is_program_token(&self, item: &LexItem) -> bool {
        item.kind == "Text" || (!self.keep_comments && item.kind.starts_with("Comment"))
    }

    fn file_filter(&self) -> &FileFilter {
        &JAVA_FILES
    }
}

/// Explain why no rule matched at the start of `rest`.
fn unmatched(rest: &str, offset: usize) -> LexError {
    let message = if rest.starts_with("/*") {
        "unterminated comment".to_string()
    } else if rest.starts_with("\"\"\"") {
        "unterminated text block".to_string()
    } else if rest.starts_with('"') {
        "unterminated string literal".to_string()
    } else if rest.starts_with('\'') {
        "unterminated character literal".to_string()
    } else {
        match rest.chars().next() {
            Some(c) => format!("unexpected character '{}'", c.escape_default()),
            None => "unexpected end of input".to_string(),
        }
    };
    LexError::new(offset, message)
}

/// Resolve a lexer by file suffix (`java`, `.java`, `JAVA`).
pub fn lexer_for_suffix(suffix: &str, keep_comments: bool) -> Result<JavaLexer> {
    match suffix.trim_start_matches('.').to_ascii_lowercase().as_str() {
        "java" => Ok(JavaLexer { keep_comments }),
        _ => Err(VarScopeError::unsupported_language(suffix)),
    }
}

// ============================================================================
// Tests
// ============================================================================
