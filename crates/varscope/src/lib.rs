//! varscope - variable scopes and token streams for code mining.
//!
//! This crate provides the CLI binary for varscope.
//!
//! ## Modules
//!
//! - `cli` - argument types and command execution

pub mod cli;

// Re-export core types for convenience
pub use varscope_core::error::{OutputErrorCode, VarScopeError};
pub use varscope_core::output::{ErrorInfo, ErrorResponse, SCHEMA_VERSION};
