//! Configuration handling for varscope.
//!
//! ```toml
//! [tokenizer]
//! language = "java"
//! keep_comments = false
//!
//! [extraction]
//! parse_kind = "compilation-unit"
//! grouping = "textual"
//! ```
//!
//! Every field has a default, so an empty file (or no file) is valid.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, VarScopeError};
use crate::provider::ParseKind;
use crate::snippets::SnippetGrouping;

/// Directory searched for upward from the working directory.
pub const CONFIG_DIR: &str = ".varscope";

/// File name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.toml";

/// varscope configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub tokenizer: TokenizerConfig,

    #[serde(default)]
    pub extraction: ExtractionConfig,
}

/// Tokenizer settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizerConfig {
    /// Language selector (file suffix) used to pick a lexer
    #[serde(default = "default_language")]
    pub language: String,

    /// Keep comments in the token stream
    #[serde(default)]
    pub keep_comments: bool,
}

/// Scope extraction settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ExtractionConfig {
    /// How `--code` input is parsed
    #[serde(default)]
    pub parse_kind: ParseKind,

    /// How owning nodes are grouped into scope keys
    #[serde(default)]
    pub grouping: SnippetGrouping,
}

fn default_language() -> String {
    "java".to_string()
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            keep_comments: false,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            VarScopeError::config(format!(
                "failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| VarScopeError::config(format!("failed to parse config file: {}", e)))
    }

    /// Load the nearest `.varscope/config.toml` at or above `start`, or the
    /// defaults when there is none.
    pub fn load_from_project(start: &Path) -> Result<Self> {
        match find_config_from(start) {
            Some(path) => Self::load(&path),
            None => Ok(Config::default()),
        }
    }
}

/// Find `.varscope/config.toml` by searching upward from `start`, stopping
/// at the filesystem root.
pub fn find_config_from(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        let candidate = dir.join(CONFIG_DIR).join(CONFIG_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        current = dir.parent();
    }
    None
}
