//! Core infrastructure for varscope.
//!
//! This crate provides language-agnostic infrastructure:
//! - Syntax tree arena with validated declaration shapes
//! - Variable model and counted variable bags
//! - Declaration classifier, scope propagator and scope key builder
//! - Positioned tokenizer over a pluggable lexer
//! - Provider traits for language front ends
//! - Error types and error codes
//! - Configuration loading
//! - JSON output types for CLI responses

pub mod bag;
pub mod classify;
pub mod config;
pub mod error;
pub mod extract;
pub mod filter;
pub mod model;
pub mod output;
pub mod propagate;
pub mod provider;
pub mod snippets;
pub mod tokenizer;
pub mod tree;

#[cfg(test)]
mod testing;
