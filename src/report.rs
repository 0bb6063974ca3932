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

//! Request and report payloads

use serde::{Deserialize, Serialize};

use crate::analyzer::SemanticReport;
use crate::parser::{LexicalReport, SyntaxReport};

/// Message of a report whose stages all came back valid
pub const SUCCESS_MESSAGE: &str = "analysis completed successfully";

/// Message of a report with syntax or semantic errors
pub const FAILURE_MESSAGE: &str = "analysis completed with errors";

/// Incoming analysis request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Source text to analyze
    #[serde(default)]
    pub code: String,
}

/// Combined output of the three stages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Tokens and per-kind counts
    pub lexical: LexicalReport,
    /// Diagnostics and AST
    pub syntax: SyntaxReport,
    /// Checks, symbols and warnings
    pub semantic: SemanticReport,
    /// Syntax and semantic stages both valid
    pub success: bool,
    /// Human-readable summary
    pub message: String,
}

impl AnalysisReport {
    /// Merge stage outputs; `success` requires both syntax and semantics valid
    pub fn assemble(
        lexical: LexicalReport,
        syntax: SyntaxReport,
        semantic: SemanticReport,
    ) -> Self {
        let success = syntax.valid && semantic.valid;
        let message = if success { SUCCESS_MESSAGE } else { FAILURE_MESSAGE };
        Self {
            lexical,
            syntax,
            semantic,
            success,
            message: message.to_string(),
        }
    }
}

/// Body returned when a request is refused before analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionResponse {
    /// Always false
    pub success: bool,
    /// Reason for the rejection
    pub message: String,
}

impl RejectionResponse {
    /// Create a rejection with the given reason
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
