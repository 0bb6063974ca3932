// Copyright 2024 MiniPy Analyzer Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Semantic analysis of parsed snippets
//!
//! This module provides:
//! - Symbol table construction with dotted scope paths
//! - Unresolved-identifier warnings
//! - A fixed battery of checks over the tokens and the symbol table
//!
//! Analysis is total: any tree the parser returns, however partial, yields a
//! report.

pub mod checks;
pub mod symbol_table;

pub use checks::{CheckBattery, CheckContext, CheckOutput, CheckRecord, SemanticCheck, TokenView};
pub use symbol_table::{
    GLOBAL_SCOPE, Symbol, SymbolCollector, SymbolKind, SymbolTable, child_scope, is_builtin,
};

use serde::{Deserialize, Serialize};

use crate::ast::AstNode;
use crate::parser::tokenizer::Token;

/// Names the check battery looks for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Function checked for definition-before-use and recursion
    pub target_function: String,
    /// Parameter that must be read when declared
    pub tracked_parameter: String,
    /// Builtin whose calls must pass arguments
    pub call_builtin: String,
    /// Two names that must not share a scope
    pub scope_pair: (String, String),
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            target_function: "factorial".to_string(),
            tracked_parameter: "n".to_string(),
            call_builtin: "print".to_string(),
            scope_pair: ("x".to_string(), "n".to_string()),
        }
    }
}

/// Output of the semantic stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticReport {
    /// One record per check, in battery order
    pub checks: Vec<CheckRecord>,
    /// Current symbols, one per name
    pub symbol_table: Vec<Symbol>,
    /// Informational findings
    pub warnings: Vec<String>,
    /// True iff no hard errors were found
    pub valid: bool,
    /// Hard errors; only reflected on the wire through `valid`
    #[serde(skip)]
    pub errors: Vec<String>,
}

/// Runs symbol collection and the check battery
pub struct SemanticAnalyzer {
    config: AnalyzerConfig,
    battery: CheckBattery,
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}

impl SemanticAnalyzer {
    /// Create an analyzer with the standard battery
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            config,
            battery: CheckBattery::standard(),
        }
    }

    /// Replace the check battery
    pub fn with_battery(mut self, battery: CheckBattery) -> Self {
        self.battery = battery;
        self
    }

    /// Current configuration
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze a tree together with the raw tokens it was parsed from
    pub fn analyze(&self, tokens: &[Token], ast: &AstNode) -> SemanticReport {
        let (table, mut warnings) = SymbolCollector::collect(ast);

        let ctx = CheckContext {
            tokens: TokenView::new(tokens),
            table: &table,
            config: &self.config,
        };
        let output = self.battery.run_all(&ctx);
        warnings.extend(output.warnings);

        log::debug!(
            "semantic analysis: {} symbols, {} checks, {} warnings, {} errors",
            table.len(),
            output.checks.len(),
            warnings.len(),
            output.errors.len()
        );

        SemanticReport {
            checks: output.checks,
            symbol_table: table.into_symbols(),
            warnings,
            valid: output.errors.is_empty(),
            errors: output.errors,
        }
    }
}

/// Analyze with the default configuration
pub fn analyze(tokens: &[Token], ast: &AstNode) -> SemanticReport {
    SemanticAnalyzer::default().analyze(tokens, ast)
}
