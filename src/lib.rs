//! MiniPy snippet analyzer
//!
//! Lexical, syntactic and semantic analysis of short Python-like snippets,
//! producing one structured report per run.
//!
//! ```
//! let report = minipy_analyzer::analyze_source("x = 1\nprint(x)\n");
//! assert!(report.syntax.valid);
//! ```

pub mod analyzer;
pub mod ast;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod parser;
pub mod report;

// Re-export main types
pub use analyzer::{
    AnalyzerConfig, CheckRecord, SemanticAnalyzer, SemanticReport, Symbol, SymbolKind,
};
pub use ast::{AstNode, NodeKind};
pub use config::EngineConfig;
pub use engine::{AnalysisEngine, EngineInfo, HealthStatus};
pub use error::{AnalysisError, Result};
pub use parser::{LexicalReport, SyntaxReport, Token, TokenKind, parse, tokenize};
pub use report::{AnalysisReport, AnalysisRequest, RejectionResponse};

/// Run the whole pipeline with the default configuration
pub fn analyze_source(source: &str) -> AnalysisReport {
    AnalysisEngine::new().analyze(source)
}
