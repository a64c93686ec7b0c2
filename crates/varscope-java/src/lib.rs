// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Java language support for varscope.
//!
//! - [`JavaTreeProvider`]: parses Java with tree-sitter-java into a varscope
//!   syntax tree with declaration shapes
//! - [`JavaLexer`]: Pygments-style regex lexer feeding the code tokenizer

pub mod lexer;
pub mod tree;

pub use lexer::{lexer_for_suffix, JavaLexer, IDENTIFIER_KIND};
pub use tree::{provider_for_suffix, JavaTreeProvider};
