//! Abstract Syntax Tree (AST) definitions for MiniPy snippets
//!
//! The tree is uniform: every node carries a kind, an optional
//! text value, ordered children and the line it started on.

#![warn(missing_docs)]

mod node;
mod visitor;

pub use node::*;
pub use visitor::*;
