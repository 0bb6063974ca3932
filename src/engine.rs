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

//! Analysis engine
//!
//! Runs tokenizer, parser and semantic analyzer in sequence. Every stage runs
//! even when an earlier one reports errors. The engine keeps no state between
//! calls, so one instance can serve any number of threads.

use serde::{Deserialize, Serialize};

use crate::analyzer::SemanticAnalyzer;
use crate::config::EngineConfig;
use crate::error::{AnalysisError, Result};
use crate::parser::{TokenKind, parse, tokenize};
use crate::report::{AnalysisReport, AnalysisRequest};

/// Service name reported by [`AnalysisEngine::health`]
pub const SERVICE_NAME: &str = "minipy-analyzer";

/// Description of the engine's capabilities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineInfo {
    /// Display name
    pub name: String,
    /// One-line description
    pub description: String,
    /// Crate version
    pub version: String,
    /// What the analysis covers
    pub capabilities: Vec<String>,
    /// Language constructs the parser understands
    pub supported_constructs: Vec<String>,
    /// Token kind vocabulary used in reports
    pub token_types: Vec<String>,
}

/// Liveness response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Always `ok`
    pub status: String,
    /// Service name
    pub service: String,
    /// Crate version
    pub version: String,
}

/// The three-stage analysis pipeline
pub struct AnalysisEngine {
    config: EngineConfig,
    analyzer: SemanticAnalyzer,
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisEngine {
    /// Create an engine with the default configuration
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create an engine with a custom configuration
    pub fn with_config(config: EngineConfig) -> Self {
        let analyzer = SemanticAnalyzer::new(config.analyzer.clone());
        Self { config, analyzer }
    }

    /// Current configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run all three stages on `source`
    ///
    /// Never fails; problems are reported inside the returned report.
    pub fn analyze(&self, source: &str) -> AnalysisReport {
        let lexical = tokenize(source);
        let syntax = parse(&lexical.tokens);
        let semantic = self.analyzer.analyze(&lexical.tokens, &syntax.ast);
        let report = AnalysisReport::assemble(lexical, syntax, semantic);
        log::debug!("analysis finished: success={}", report.success);
        report
    }

    /// Reject empty or oversized source
    pub fn validate_source(&self, source: &str) -> Result<()> {
        if source.is_empty() {
            return Err(AnalysisError::EmptySource);
        }
        if let Some(limit) = self.config.max_source_bytes {
            if source.len() > limit {
                return Err(AnalysisError::SourceTooLarge {
                    len: source.len(),
                    limit,
                });
            }
        }
        Ok(())
    }

    /// Validate `source`, then analyze it
    pub fn analyze_checked(&self, source: &str) -> Result<AnalysisReport> {
        self.validate_source(source).inspect_err(|e| log::warn!("rejected source: {e}"))?;
        Ok(self.analyze(source))
    }

    /// Handle a JSON request body of the form `{"code": "..."}`
    pub fn handle_request(&self, body: &str) -> Result<AnalysisReport> {
        let request: AnalysisRequest = serde_json::from_str(body)
            .map_err(AnalysisError::from)
            .inspect_err(|e| log::warn!("rejected request: {e}"))?;
        self.analyze_checked(&request.code)
    }

    /// Handle a JSON request body and serialize whatever the outcome is
    pub fn respond(&self, body: &str) -> serde_json::Result<String> {
        match self.handle_request(body) {
            Ok(report) => serde_json::to_string(&report),
            Err(error) => serde_json::to_string(&error.rejection()),
        }
    }

    /// Describe the analyzer
    pub fn info(&self) -> EngineInfo {
        let strings = |items: &[&str]| items.iter().map(|item| item.to_string()).collect();
        EngineInfo {
            name: "MiniPy lexical, syntactic and semantic analyzer".to_string(),
            description: "Analysis pipeline for short Python-like snippets".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            capabilities: strings(&[
                "lexical analysis with token classification",
                "syntactic analysis with AST construction",
                "semantic analysis with a symbol table",
                "checks for a distinguished recursive function",
            ]),
            supported_constructs: strings(&[
                "function definitions",
                "conditionals (if-else)",
                "recursive calls",
                "arithmetic expressions",
                "variable assignment",
                "function calls",
            ]),
            token_types: TokenKind::ALL
                .iter()
                .map(|kind| kind.as_str().to_string())
                .collect(),
        }
    }

    /// Liveness information
    pub fn health(&self) -> HealthStatus {
        HealthStatus {
            status: "ok".to_string(),
            service: SERVICE_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
