//! CLI front door for varscope.
//!
//! Argument types are declared here so they can be parsed and executed from
//! tests; `main.rs` only installs tracing, runs [`run`], and turns the
//! outcome into JSON on stdout plus an exit code.
//!
//! ## Commands
//!
//! - `scopes <FILE> | --code <TEXT>` - scope snippets with their names
//! - `visible <FILE> | --code <TEXT>` - variables visible at each node
//! - `tokens <FILE> | --code <TEXT> [--positions]` - lexical token stream
//! - `token <TEXT>` - first token of a string
//! - `identifier-type` - token kind the lexer uses for identifiers
//!
//! ## Configuration
//!
//! Settings come from `--config <path>` or the nearest
//! `.varscope/config.toml` above the working directory; `--parse-kind`,
//! `--grouping` and `--keep-comments` override the file.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{debug, info_span};

use varscope_core::config::Config;
use varscope_core::error::{Result, VarScopeError};
use varscope_core::extract::{ScopeAnalysis, ScopeExtractor};
use varscope_core::output::{
    IdentifierTypeResponse, ScopesResponse, TokenResponse, TokensResponse, VisibleResponse,
};
use varscope_core::provider::{Lexer, ParseKind};
use varscope_core::snippets::SnippetGrouping;
use varscope_core::tokenizer::CodeTokenizer;
use varscope_java::{lexer_for_suffix, provider_for_suffix, JavaLexer};

/// Label used as `source` for inline `--code` input.
pub const INLINE_SOURCE: &str = "<code>";

// ============================================================================
// CLI Structure
// ============================================================================

/// Per-node variable visibility and token streams for source code.
///
/// All output is JSON on stdout; logs go to stderr.
#[derive(Parser, Debug)]
#[command(
    name = "varscope",
    version,
    about = "Per-node variable visibility and token streams for source code"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,
    #[command(subcommand)]
    pub command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Log level for tracing output (overridden by RUST_LOG).
    #[arg(long, global = true, value_enum, default_value = "warn")]
    pub log_level: LogLevel,

    /// Configuration file (default: nearest .varscope/config.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// How inline code is parsed: compilation-unit, class-body, method,
    /// statements, expression.
    #[arg(long, global = true)]
    pub parse_kind: Option<ParseKind>,

    /// How scope keys are grouped: textual or per-node.
    #[arg(long, global = true)]
    pub grouping: Option<SnippetGrouping>,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Source to analyze: a file path or inline code.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct InputArgs {
    /// Source file; its extension selects the language.
    pub file: Option<PathBuf>,

    /// Inline source text, parsed with --parse-kind.
    #[arg(long)]
    pub code: Option<String>,
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List scope snippets and the names each one declares.
    Scopes {
        #[command(flatten)]
        input: InputArgs,
    },
    /// List the variables visible at every node that sees any.
    Visible {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Tokenize source, dropping whitespace (and comments unless kept).
    Tokens {
        #[command(flatten)]
        input: InputArgs,
        /// Include each token's byte offset.
        #[arg(long)]
        positions: bool,
        /// Keep comment tokens in the stream.
        #[arg(long)]
        keep_comments: bool,
    },
    /// Tokenize a string and report its first token.
    Token {
        /// Text to tokenize.
        text: String,
    },
    /// Report the token kind used for identifiers.
    IdentifierType,
}

impl Command {
    /// Subcommand name as typed on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Scopes { .. } => "scopes",
            Command::Visible { .. } => "visible",
            Command::Tokens { .. } => "tokens",
            Command::Token { .. } => "token",
            Command::IdentifierType => "identifier-type",
        }
    }
}

// ============================================================================
// Settings
// ============================================================================

/// Configuration after command-line overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub language: String,
    pub keep_comments: bool,
    pub parse_kind: ParseKind,
    pub grouping: SnippetGrouping,
}

impl Settings {
    /// Apply the global overrides to a loaded configuration.
    pub fn resolve(config: Config, global: &GlobalArgs) -> Self {
        Settings {
            language: config.tokenizer.language,
            keep_comments: config.tokenizer.keep_comments,
            parse_kind: global.parse_kind.unwrap_or(config.extraction.parse_kind),
            grouping: global.grouping.unwrap_or(config.extraction.grouping),
        }
    }

    /// Load configuration for `global` and apply its overrides.
    pub fn load(global: &GlobalArgs) -> Result<Self> {
        let config = match &global.config {
            Some(path) => Config::load(path)?,
            None => {
                let cwd = env::current_dir().map_err(|e| {
                    VarScopeError::config(format!("cannot determine working directory: {}", e))
                })?;
                Config::load_from_project(&cwd)?
            }
        };
        Ok(Self::resolve(config, global))
    }

    /// Language selector for `input`: the file extension when there is
    /// one, else the configured language.
    fn language_for<'a>(&'a self, input: &'a InputArgs) -> &'a str {
        input
            .file
            .as_deref()
            .and_then(Path::extension)
            .and_then(|ext| ext.to_str())
            .unwrap_or(self.language.as_str())
    }
}

// ============================================================================
// Execution
// ============================================================================

/// Any successful command response.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Response {
    Scopes(ScopesResponse),
    Visible(VisibleResponse),
    Tokens(TokensResponse),
    Token(TokenResponse),
    IdentifierType(IdentifierTypeResponse),
}

/// Execute a parsed command line.
pub fn run(cli: &Cli) -> Result<Response> {
    let _span = info_span!("command", name = cli.command.name()).entered();
    let settings = Settings::load(&cli.global)?;
    debug!(?settings, "resolved settings");
    execute(&cli.command, &settings)
}

/// Execute `command` with already-resolved settings.
pub fn execute(command: &Command, settings: &Settings) -> Result<Response> {
    match command {
        Command::Scopes { input } => {
            let analysis = analyze(input, settings)?;
            let scopes = analysis.snippets(settings.grouping);
            Ok(Response::Scopes(ScopesResponse::new(
                source_label(input),
                analysis.stats(),
                scopes,
            )))
        }
        Command::Visible { input } => {
            let analysis = analyze(input, settings)?;
            Ok(Response::Visible(VisibleResponse::from_analysis(
                source_label(input),
                &analysis,
            )))
        }
        Command::Tokens {
            input,
            positions,
            keep_comments,
        } => {
            let tokenizer = tokenizer_for(
                settings.language_for(input),
                settings.keep_comments || *keep_comments,
            )?;
            let code = read_input(input)?;
            let response = if *positions {
                TokensResponse::from_positioned(
                    source_label(input),
                    tokenizer.full_token_list_with_pos(&code)?,
                )
            } else {
                TokensResponse::from_list(
                    source_label(input),
                    tokenizer.token_list_from_code(&code)?,
                )
            };
            Ok(Response::Tokens(response))
        }
        Command::Token { text } => {
            let tokenizer = tokenizer_for(&settings.language, settings.keep_comments)?;
            let token = tokenizer.token_from_string(text)?;
            Ok(Response::Token(TokenResponse::new(
                token,
                tokenizer.identifier_type(),
            )))
        }
        Command::IdentifierType => {
            let tokenizer = tokenizer_for(&settings.language, settings.keep_comments)?;
            Ok(Response::IdentifierType(IdentifierTypeResponse::new(
                settings.language.as_str(),
                tokenizer.identifier_type(),
            )))
        }
    }
}

fn analyze(input: &InputArgs, settings: &Settings) -> Result<ScopeAnalysis> {
    let provider = provider_for_suffix(settings.language_for(input))?;
    let extractor = ScopeExtractor::new(provider).with_grouping(settings.grouping);
    match (&input.file, &input.code) {
        (_, Some(code)) => extractor.analyze_str(code, settings.parse_kind),
        (Some(path), None) => extractor.analyze_file(path),
        (None, None) => Err(VarScopeError::config("no input: give a file or --code")),
    }
}

fn tokenizer_for(language: &str, keep_comments: bool) -> Result<CodeTokenizer<JavaLexer>> {
    let lexer = lexer_for_suffix(language, keep_comments)?;
    debug!(
        language,
        keep_comments,
        identifier_type = lexer.identifier_type(),
        "selected lexer"
    );
    Ok(CodeTokenizer::new(lexer))
}

fn read_input(input: &InputArgs) -> Result<String> {
    match (&input.file, &input.code) {
        (_, Some(code)) => Ok(code.clone()),
        (Some(path), None) => {
            fs::read_to_string(path).map_err(|e| VarScopeError::input_read(path, e))
        }
        (None, None) => Err(VarScopeError::config("no input: give a file or --code")),
    }
}

fn source_label(input: &InputArgs) -> String {
    match (&input.file, &input.code) {
        (Some(path), None) => path.display().to_string(),
        _ => INLINE_SOURCE.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================
