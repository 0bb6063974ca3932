//! MiniPy tokenizer and parser
//!
//! The tokenizer classifies every lexeme. The parser drops newlines and
//! comments, runs the structural pre-checks and builds the AST by recursive
//! descent.

#![warn(missing_docs)]

pub mod descent;
pub mod error;
pub mod structure;
pub mod tokenizer;

pub use descent::{MAX_NESTING_DEPTH, Parser, SyntaxReport, parse};
pub use error::ParseDiagnostic;
pub use structure::{check_bracket_balance, check_function_shapes};
pub use tokenizer::{LexicalReport, Token, TokenKind, Tokenizer, tokenize};
